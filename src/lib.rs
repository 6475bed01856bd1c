//! # school-rbac - Role-Based Access Control for School Administration
//!
//! `school-rbac` decides who may do what in a school administration web
//! application (attendance, grading, teacher journals, scheduling, user
//! management). Permissions are a role × resource × action matrix with:
//!
//! - **Hierarchical resources**: a rule on `master` covers `master.siswa`
//! - **Wildcards**: `*` for role, resource or action, plus the `manage` meta-action
//! - **Administrator override**: admins bypass rule evaluation
//! - **Fail closed**: no matching allow rule means deny
//!
//! ## Quick Start
//!
//! ```rust
//! use school_rbac::{has_permission, PermissionRule};
//!
//! let rules = vec![
//!     PermissionRule::allow("GURU", "jurnal", "*"),
//!     PermissionRule::allow("GURU", "master", "view"),
//! ];
//!
//! assert!(has_permission(&rules, "jurnal", "delete", false));
//! assert!(has_permission(&rules, "master.siswa", "view", false));
//! assert!(!has_permission(&rules, "nilai", "view", false));
//! ```
//!
//! ## Guarding Routes
//!
//! ```rust
//! use school_rbac::{AccessControl, PermissionRule, RouteRequest, Result};
//!
//! # fn main() -> Result<()> {
//! let access = AccessControl::builder()
//!     .rule(PermissionRule::allow("GURU", "jurnal", "view"))
//!     .build()?;
//!
//! assert!(access.authorize("guru|wali_kelas", &RouteRequest::page("/jurnal")).is_ok());
//! assert!(access.authorize("guru", &RouteRequest::page("/nilai")).is_err());
//! # Ok(())
//! # }
//! ```

pub mod core;

#[allow(unused_imports)]
pub(crate) use self::core::{config, error, guard, iam, role, store, validation};

pub use crate::core::{
    config::AccessConfig,
    error::{RbacError, Result},
    guard::{
        AccessContext, AccessDenied, AccessGrant, DenialResponse, RouteGuard, RouteRequest,
    },
    iam::{has_permission, Decision, EvaluationMode, PermissionEvaluator, PermissionRule},
    role::{AdminMatch, Role, RoleSet},
    store::{MemoryRuleStore, RuleStore},
};

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// High-level access control API
///
/// Bundles a rule store, configuration and a [`RouteGuard`]:
/// - Authorize requests
/// - Build per-request contexts for conditional rendering
/// - Edit rules (upserts invalidate cached decisions)
pub struct AccessControl {
    config: AccessConfig,
    store: Arc<dyn RuleStore>,
    guard: RouteGuard,
}

impl AccessControl {
    /// Create from configuration, seeding an in-memory store with its rules
    pub fn from_config(config: AccessConfig) -> Result<Self> {
        config.validate()?;
        let store = MemoryRuleStore::from_rules(config.rules.iter().cloned())?;
        Ok(Self::with_store(Arc::new(store), config))
    }

    /// Create over an existing rule store
    pub fn with_store(store: Arc<dyn RuleStore>, config: AccessConfig) -> Self {
        info!(
            "Access control ready (mode={}, cache_capacity={})",
            config.mode, config.cache_capacity
        );
        let guard = RouteGuard::new(store.clone(), &config);
        AccessControl {
            config,
            store,
            guard,
        }
    }

    /// Start a builder
    pub fn builder() -> AccessControlBuilder {
        AccessControlBuilder::new()
    }

    /// Authorize a request for a principal's raw role string
    pub fn authorize(
        &self,
        raw_roles: &str,
        request: &RouteRequest,
    ) -> std::result::Result<AccessGrant, AccessDenied> {
        self.guard.authorize(raw_roles, request)
    }

    /// Per-request context for a principal
    pub fn context_for(&self, raw_roles: &str) -> Result<AccessContext> {
        self.guard.context_for(raw_roles)
    }

    /// Insert or replace a rule
    pub fn upsert_rule(&self, rule: PermissionRule) -> Result<()> {
        debug!("Updating rule {}/{}/{}", rule.role, rule.resource, rule.action);
        self.store.upsert(rule)
    }

    /// Remove a rule; returns whether it existed
    pub fn remove_rule(&self, role: &str, resource: &str, action: &str) -> Result<bool> {
        self.store.remove(role, resource, action)
    }

    /// All stored rules
    pub fn rules(&self) -> Result<Vec<PermissionRule>> {
        self.store.all()
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }
}

/// Builder for [`AccessControl`]
///
/// # Examples
///
/// ```rust
/// use school_rbac::{AccessControl, EvaluationMode, PermissionRule};
///
/// # fn main() -> school_rbac::Result<()> {
/// let access = AccessControl::builder()
///     .mode(EvaluationMode::DenyOverrides)
///     .admin_roles(["KEPALA_SEKOLAH"])
///     .rule(PermissionRule::allow("GURU", "jurnal", "*"))
///     .rule(PermissionRule::deny("GURU", "jurnal", "delete"))
///     .build()?;
///
/// let ctx = access.context_for("guru")?;
/// assert!(ctx.can("jurnal", "update"));
/// assert!(!ctx.can("jurnal", "delete"));
/// # Ok(())
/// # }
/// ```
pub struct AccessControlBuilder {
    config: AccessConfig,
    config_path: Option<PathBuf>,
    rules_path: Option<PathBuf>,
    rules: Vec<PermissionRule>,
}

impl AccessControlBuilder {
    pub fn new() -> Self {
        AccessControlBuilder {
            config: AccessConfig::default(),
            config_path: None,
            rules_path: None,
            rules: Vec::new(),
        }
    }

    /// Start from an explicit configuration
    pub fn config(mut self, config: AccessConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a TOML file at build time
    pub fn config_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Load additional rules from a JSON file at build time
    pub fn rules_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.rules_path = Some(path.into());
        self
    }

    /// Add a rule
    pub fn rule(mut self, rule: PermissionRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Set the evaluation mode
    pub fn mode(mut self, mode: EvaluationMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the administrator roles
    pub fn admin_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.admin_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Set the decision cache capacity (0 disables)
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    /// Build the access control instance
    pub fn build(self) -> Result<AccessControl> {
        let mut config = match self.config_path {
            Some(path) => AccessConfig::load(path)?,
            None => self.config,
        };

        if let Some(path) = self.rules_path {
            let store = MemoryRuleStore::load_json(path)?;
            config.rules.extend(store.all()?);
        }
        config.rules.extend(self.rules);

        AccessControl::from_config(config)
    }
}

impl Default for AccessControlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder_defaults() {
        let access = AccessControl::builder().build().unwrap();
        assert_eq!(access.config().mode, EvaluationMode::AnyAllow);
        assert!(access.rules().unwrap().is_empty());
        assert!(access.authorize("guru", &RouteRequest::page("/jurnal")).is_err());
    }

    #[test]
    fn test_builder_rejects_invalid_rule() {
        let result = AccessControl::builder()
            .rule(PermissionRule::allow("GURU", "Jurnal Guru", "view"))
            .build();
        assert!(matches!(result, Err(RbacError::InvalidResource(_))));
    }

    #[test]
    fn test_custom_admin_roles() {
        let access = AccessControl::builder()
            .admin_roles(["KEPALA_SEKOLAH"])
            .build()
            .unwrap();

        assert!(access
            .authorize("kepala_sekolah", &RouteRequest::new("DELETE", "/nilai"))
            .is_ok());
        // substring matching is against the configured tokens only
        assert!(access
            .authorize("admin", &RouteRequest::page("/nilai"))
            .is_err());
    }

    #[test]
    fn test_rules_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"role": "SISWA", "resource": "jadwal", "action": "view"}}]"#
        )
        .unwrap();

        let access = AccessControl::builder()
            .rules_file(file.path())
            .rule(PermissionRule::allow("GURU", "jurnal", "view"))
            .build()
            .unwrap();

        assert_eq!(access.rules().unwrap().len(), 2);
        assert!(access.authorize("siswa", &RouteRequest::page("/jadwal")).is_ok());
    }

    #[test]
    fn test_config_rules_with_lowercase_roles() {
        let config = AccessConfig::from_toml_str(
            r#"
            [[rules]]
            role = "guru"
            resource = "jurnal"
            action = "view"
            "#,
        )
        .unwrap();

        let access = AccessControl::from_config(config).unwrap();
        assert!(access.authorize("GURU", &RouteRequest::page("/jurnal")).is_ok());
        assert_eq!(access.rules().unwrap()[0].role, "GURU");
    }

    #[test]
    fn test_rule_editing() {
        let access = AccessControl::builder().build().unwrap();
        let request = RouteRequest::page("/absensi");

        assert!(access.authorize("guru", &request).is_err());

        access
            .upsert_rule(PermissionRule::allow("GURU", "absensi", "view"))
            .unwrap();
        assert!(access.authorize("guru", &request).is_ok());

        assert!(access.remove_rule("GURU", "absensi", "view").unwrap());
        assert!(access.authorize("guru", &request).is_err());
    }
}
