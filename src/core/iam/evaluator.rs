//! Permission evaluation
//!
//! Decides whether a principal may perform an action on a resource given a
//! pre-fetched rule set. Key properties:
//! - Administrators bypass rule evaluation entirely
//! - Fail closed: no matching allow rule means deny
//! - Pure: no state, no I/O, safe to call from any thread
//!
//! The default mode grants when any matching rule allows. Deny precedence is
//! opt-in through [`EvaluationMode`].

use super::resource::ResourcePath;
use super::rule::{PermissionRule, MANAGE, WILDCARD};
use crate::error::RbacError;
use crate::role::RoleSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decide whether `rules` grant `action` on `resource`.
///
/// Returns `true` immediately when `is_admin_override` is set. Otherwise
/// returns `true` iff at least one rule matches the resource (wildcard,
/// exact, or ancestor), matches the action (wildcard, exact, or `manage`)
/// and is allowed. Empty resource or action always denies.
///
/// # Examples
///
/// ```
/// use school_rbac::core::iam::{has_permission, PermissionRule};
///
/// let rules = vec![PermissionRule::allow("GURU", "master", "view")];
///
/// assert!(has_permission(&rules, "master.siswa", "view", false));
/// assert!(!has_permission(&rules, "masterdata", "view", false));
/// assert!(has_permission(&[], "nilai", "delete", true));
/// ```
pub fn has_permission(
    rules: &[PermissionRule],
    resource: &str,
    action: &str,
    is_admin_override: bool,
) -> bool {
    if is_admin_override {
        return true;
    }
    if resource.is_empty() || action.is_empty() {
        return false;
    }
    rules
        .iter()
        .any(|rule| rule.is_allowed && rule.applies_to(resource, action))
}

/// How matching allow and deny rules combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluationMode {
    /// Any matching allow rule grants; deny rules never revoke
    #[default]
    #[serde(alias = "any_allow")]
    AnyAllow,
    /// Any matching deny rule revokes every grant
    #[serde(alias = "deny_overrides")]
    DenyOverrides,
    /// The most specific matching rule decides; ties go to deny
    #[serde(alias = "most_specific")]
    MostSpecific,
}

impl EvaluationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationMode::AnyAllow => "any-allow",
            EvaluationMode::DenyOverrides => "deny-overrides",
            EvaluationMode::MostSpecific => "most-specific",
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvaluationMode {
    type Err = RbacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "any-allow" | "anyallow" => Ok(EvaluationMode::AnyAllow),
            "deny-overrides" | "denyoverrides" => Ok(EvaluationMode::DenyOverrides),
            "most-specific" | "mostspecific" => Ok(EvaluationMode::MostSpecific),
            _ => Err(RbacError::UnknownMode(s.to_string())),
        }
    }
}

/// Outcome of a single access check, with the reason attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Principal holds an administrator role
    AdminOverride,
    /// A matching allow rule granted access
    Granted { rule: PermissionRule },
    /// A matching deny rule revoked access
    DeniedByRule { rule: PermissionRule },
    /// Nothing matched, or the request was malformed
    NoMatchingRule,
}

impl Decision {
    /// Whether access is granted
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::AdminOverride | Decision::Granted { .. })
    }

    /// The rule responsible for the outcome, if any
    pub fn rule(&self) -> Option<&PermissionRule> {
        match self {
            Decision::Granted { rule } | Decision::DeniedByRule { rule } => Some(rule),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::AdminOverride => write!(f, "allowed: administrator override"),
            Decision::Granted { rule } => write!(
                f,
                "allowed by rule {}/{}/{}",
                rule.role, rule.resource, rule.action
            ),
            Decision::DeniedByRule { rule } => write!(
                f,
                "denied by rule {}/{}/{}",
                rule.role, rule.resource, rule.action
            ),
            Decision::NoMatchingRule => write!(f, "denied: no matching rule"),
        }
    }
}

/// Role-aware evaluator
///
/// Filters rules down to those that apply to the principal's roles, applies
/// the administrator override, then combines the matching rules according to
/// its [`EvaluationMode`]. Holds no per-request state.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionEvaluator {
    mode: EvaluationMode,
}

impl PermissionEvaluator {
    /// Create an evaluator with the given combination mode
    pub fn new(mode: EvaluationMode) -> Self {
        PermissionEvaluator { mode }
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// Boolean form of [`PermissionEvaluator::decide`]
    pub fn check(
        &self,
        roles: &RoleSet,
        rules: &[PermissionRule],
        resource: &str,
        action: &str,
    ) -> bool {
        self.decide(roles, rules, resource, action).is_allowed()
    }

    /// Evaluate an access request and report why it was decided
    pub fn decide(
        &self,
        roles: &RoleSet,
        rules: &[PermissionRule],
        resource: &str,
        action: &str,
    ) -> Decision {
        if roles.is_admin() {
            return Decision::AdminOverride;
        }
        if resource.is_empty() || action.is_empty() {
            return Decision::NoMatchingRule;
        }

        let matching = rules
            .iter()
            .filter(|rule| roles.iter().any(|role| rule.applies_to_role(role.as_str())))
            .filter(|rule| rule.applies_to(resource, action));

        match self.mode {
            EvaluationMode::AnyAllow => Self::any_allow(matching),
            EvaluationMode::DenyOverrides => Self::deny_overrides(matching),
            EvaluationMode::MostSpecific => Self::most_specific(matching),
        }
    }

    fn any_allow<'r>(mut matching: impl Iterator<Item = &'r PermissionRule>) -> Decision {
        match matching.find(|rule| rule.is_allowed) {
            Some(rule) => Decision::Granted { rule: rule.clone() },
            None => Decision::NoMatchingRule,
        }
    }

    fn deny_overrides<'r>(matching: impl Iterator<Item = &'r PermissionRule>) -> Decision {
        let mut grant = None;

        for rule in matching {
            if !rule.is_allowed {
                // Explicit deny - immediately return
                return Decision::DeniedByRule { rule: rule.clone() };
            }
            if grant.is_none() {
                grant = Some(rule);
            }
        }

        match grant {
            Some(rule) => Decision::Granted { rule: rule.clone() },
            None => Decision::NoMatchingRule,
        }
    }

    fn most_specific<'r>(matching: impl Iterator<Item = &'r PermissionRule>) -> Decision {
        // (resource depth, action specificity, deny) - higher wins
        let best = matching.max_by_key(|rule| {
            (
                ResourcePath::parse(&rule.resource).depth(),
                action_specificity(&rule.action),
                !rule.is_allowed,
            )
        });

        match best {
            Some(rule) if rule.is_allowed => Decision::Granted { rule: rule.clone() },
            Some(rule) => Decision::DeniedByRule { rule: rule.clone() },
            None => Decision::NoMatchingRule,
        }
    }
}

fn action_specificity(action: &str) -> u8 {
    match action {
        WILDCARD => 0,
        MANAGE => 1,
        _ => 2,
    }
}
