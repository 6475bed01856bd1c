//! Access control configuration
//!
//! Loaded from a TOML file, then overridden from `RBAC_*` environment
//! variables:
//!
//! ```toml
//! admin_roles = ["ADMIN", "ADMINISTRATOR"]
//! admin_match = "substring"
//! mode = "any-allow"
//! cache_capacity = 1024
//! default_redirect = "/dashboard"
//! api_prefix = "/api"
//! home_resource = "dashboard"
//!
//! [[rules]]
//! role = "GURU"
//! resource = "jurnal"
//! action = "view"
//! ```

use crate::error::{RbacError, Result};
use crate::iam::{EvaluationMode, PermissionRule};
use crate::role::{AdminMatch, AdminMatcher, DEFAULT_ADMIN_ROLES};
use crate::validation::validate_resource;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Environment variable overriding `admin_roles` (comma or pipe separated)
pub const ENV_ADMIN_ROLES: &str = "RBAC_ADMIN_ROLES";
/// Environment variable overriding `mode`
pub const ENV_MODE: &str = "RBAC_MODE";
/// Environment variable overriding `cache_capacity`
pub const ENV_CACHE_CAPACITY: &str = "RBAC_CACHE_CAPACITY";
/// Environment variable overriding `default_redirect`
pub const ENV_DEFAULT_REDIRECT: &str = "RBAC_DEFAULT_REDIRECT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Roles carrying the administrator override
    pub admin_roles: Vec<String>,

    /// How roles are compared against `admin_roles`
    pub admin_match: AdminMatch,

    /// How matching allow/deny rules combine
    pub mode: EvaluationMode,

    /// Decision cache entries; 0 disables caching
    pub cache_capacity: usize,

    /// Where denied page loads are redirected
    pub default_redirect: String,

    /// Paths under this prefix are API routes (403 instead of redirect)
    pub api_prefix: String,

    /// Leading path segment stripped before deriving resources (e.g. "/app")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount_prefix: Option<String>,

    /// Resource used for the root path
    pub home_resource: String,

    /// Seed rules
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<PermissionRule>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        AccessConfig {
            admin_roles: DEFAULT_ADMIN_ROLES.iter().map(|s| s.to_string()).collect(),
            admin_match: AdminMatch::default(),
            mode: EvaluationMode::default(),
            cache_capacity: 1024,
            default_redirect: "/dashboard".to_string(),
            api_prefix: "/api".to_string(),
            mount_prefix: None,
            home_resource: "dashboard".to_string(),
            rules: Vec::new(),
        }
    }
}

impl AccessConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let mut config: AccessConfig = toml::from_str(toml_str)?;
        config.normalize_rules();
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file, apply environment overrides, validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RbacError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: AccessConfig = toml::from_str(&content)?;
        config.normalize_rules();
        config.apply_env_overrides()?;
        config.validate()?;
        info!(
            "Loaded access config from {:?} (mode={}, {} seed rules)",
            path,
            config.mode,
            config.rules.len()
        );
        Ok(config)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Override fields from `RBAC_*` environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Override fields from an arbitrary variable lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(val) = lookup(ENV_ADMIN_ROLES) {
            self.admin_roles = val
                .split(&[',', '|'][..])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(val) = lookup(ENV_MODE) {
            self.mode = val.parse().map_err(|_| RbacError::InvalidEnvVar {
                name: ENV_MODE.to_string(),
                message: format!("unknown mode '{}'", val),
            })?;
        }

        if let Some(val) = lookup(ENV_CACHE_CAPACITY) {
            self.cache_capacity = val.trim().parse().map_err(|_| RbacError::InvalidEnvVar {
                name: ENV_CACHE_CAPACITY.to_string(),
                message: format!("expected a non-negative integer, got '{}'", val),
            })?;
        }

        if let Some(val) = lookup(ENV_DEFAULT_REDIRECT) {
            self.default_redirect = val;
        }

        Ok(())
    }

    /// Normalize seed rule roles so `role = "guru"` matches `GURU`
    pub fn normalize_rules(&mut self) {
        for rule in &mut self.rules {
            rule.normalize();
        }
    }

    /// Validate all fields. Rule roles are checked in normalized form.
    pub fn validate(&self) -> Result<()> {
        if self.admin_roles.iter().all(|r| r.trim().is_empty()) {
            return Err(RbacError::InvalidConfig(
                "admin_roles must contain at least one role".to_string(),
            ));
        }

        if !self.default_redirect.starts_with('/') {
            return Err(RbacError::InvalidConfig(format!(
                "default_redirect '{}' must be an absolute path",
                self.default_redirect
            )));
        }

        if !self.api_prefix.starts_with('/') {
            return Err(RbacError::InvalidConfig(format!(
                "api_prefix '{}' must be an absolute path",
                self.api_prefix
            )));
        }

        if let Some(prefix) = &self.mount_prefix {
            if !prefix.starts_with('/') {
                return Err(RbacError::InvalidConfig(format!(
                    "mount_prefix '{}' must be an absolute path",
                    prefix
                )));
            }
        }

        validate_resource(&self.home_resource)?;

        for rule in &self.rules {
            let mut rule = rule.clone();
            rule.normalize();
            rule.validate()?;
        }

        Ok(())
    }

    /// Administrator matcher built from `admin_roles` and `admin_match`
    pub fn admin_matcher(&self) -> AdminMatcher {
        AdminMatcher::new(&self.admin_roles, self.admin_match)
    }
}
