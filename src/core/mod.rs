//! Core access control implementation

pub mod config;
pub mod error;
pub mod guard;
pub mod iam;
pub mod role;
pub mod store;
pub mod validation;
