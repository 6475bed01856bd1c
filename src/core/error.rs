use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RbacError {
    #[error("Invalid role: {0} (must be uppercase letters, digits or underscores, or '*')")]
    InvalidRole(String),

    #[error("Invalid resource: {0} (must be dot- or colon-delimited lowercase segments, or '*')")]
    InvalidResource(String),

    #[error("Invalid action: {0} (must be a lowercase verb, 'tab:<name>', or '*')")]
    InvalidAction(String),

    #[error("Unknown evaluation mode: {0} (expected any-allow, deny-overrides or most-specific)")]
    UnknownMode(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid value for environment variable '{name}': {message}")]
    InvalidEnvVar { name: String, message: String },

    #[error("Failed to read '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to parse TOML config: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("Failed to serialize TOML config: {0}")]
    SerializeToml(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, RbacError>;
