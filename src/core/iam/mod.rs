//! Role-based access control for school administration pages
//!
//! Provides the permission model:
//! - Rules keyed by role, resource and action, each allowing or denying
//! - Hierarchical resource matching (`master` covers `master.siswa`)
//! - Wildcard roles, resources and actions, plus the `manage` meta-action
//! - Administrator override and fail-closed defaults
//! - Optional LRU caching of decisions on the caller side

mod cache;
mod evaluator;
mod resource;
mod rule;

pub use cache::DecisionCache;
pub use evaluator::{has_permission, Decision, EvaluationMode, PermissionEvaluator};
pub use resource::{ResourceMatcher, ResourcePath, DELIMITERS};
pub use rule::{PermissionRule, MANAGE, VIEW, WILDCARD};

#[cfg(test)]
mod tests;
