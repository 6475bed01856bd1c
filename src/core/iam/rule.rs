//! Permission rule structure
//!
//! A rule is one row of the role × resource × action matrix. Rules can grant
//! or explicitly deny; wildcards (`*`) are accepted for role, resource and
//! action, and the `manage` action satisfies any requested action.

use crate::error::Result;
use crate::validation::{validate_action, validate_resource, validate_role};
use serde::{Deserialize, Serialize};

/// Wildcard accepted for role, resource and action
pub const WILDCARD: &str = "*";

/// Meta-action satisfying any requested action on the matched resource
pub const MANAGE: &str = "manage";

/// Default action for page loads
pub const VIEW: &str = "view";

/// A single (role, resource, action, allowed) tuple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionRule {
    /// Role this rule applies to, or `*`
    pub role: String,

    /// Hierarchical resource (`master.siswa`), or `*`
    pub resource: String,

    /// Action verb, `*`, or `manage`
    pub action: String,

    /// Explicit grant (`true`) or explicit deny (`false`)
    #[serde(default = "default_allowed")]
    pub is_allowed: bool,
}

fn default_allowed() -> bool {
    true
}

impl PermissionRule {
    /// Create a granting rule. The role is normalized to uppercase.
    pub fn allow(
        role: impl AsRef<str>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self::new(role, resource, action, true)
    }

    /// Create an explicitly denying rule
    pub fn deny(
        role: impl AsRef<str>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self::new(role, resource, action, false)
    }

    /// Create a rule with an explicit allow flag
    pub fn new(
        role: impl AsRef<str>,
        resource: impl Into<String>,
        action: impl Into<String>,
        is_allowed: bool,
    ) -> Self {
        PermissionRule {
            role: role.as_ref().trim().to_uppercase(),
            resource: resource.into(),
            action: action.into(),
            is_allowed,
        }
    }

    /// Trim and uppercase the role, as the constructors do. Needed for rules
    /// deserialized from config files.
    pub fn normalize(&mut self) {
        self.role = self.role.trim().to_uppercase();
    }

    /// Check if the rule's action satisfies the requested action
    pub fn matches_action(&self, action: &str) -> bool {
        self.action == WILDCARD || self.action == MANAGE || self.action == action
    }

    /// Check if the rule's resource covers the requested resource
    pub fn matches_resource(&self, resource: &str) -> bool {
        crate::iam::ResourceMatcher::matches(&self.resource, resource)
    }

    /// Check if this rule applies to the given resource and action,
    /// regardless of its allow flag
    pub fn applies_to(&self, resource: &str, action: &str) -> bool {
        self.matches_action(action) && self.matches_resource(resource)
    }

    /// Check if the rule applies to a principal holding `role`.
    /// `role` must already be normalized (uppercase).
    pub fn applies_to_role(&self, role: &str) -> bool {
        self.role == WILDCARD || self.role.eq_ignore_ascii_case(role)
    }

    /// Validate rule identifiers
    pub fn validate(&self) -> Result<()> {
        validate_role(&self.role)?;
        validate_resource(&self.resource)?;
        validate_action(&self.action)?;
        Ok(())
    }

    /// Parse a rule list from JSON
    pub fn list_from_json(json: &str) -> std::result::Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize a rule list to JSON
    pub fn list_to_json(rules: &[Self]) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(rules)
    }
}
