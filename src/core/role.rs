//! Role resolution
//!
//! User records store roles as one raw string such as `"guru|wali_kelas"` or
//! `"GURU, ADMIN"`. This module turns that string into a normalized
//! [`RoleSet`]: split on `,` or `|`, trimmed, uppercased, deduplicated, with
//! administrator status computed once.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delimiters accepted between roles in a raw role string
pub const ROLE_DELIMITERS: [char; 2] = [',', '|'];

/// Default administrator tokens
pub const DEFAULT_ADMIN_ROLES: [&str; 2] = ["ADMIN", "ADMINISTRATOR"];

/// A normalized (uppercase, trimmed) role identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Normalize a role name. Returns `None` for blank input.
    pub fn new(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Role(name.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How role names are compared against administrator tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminMatch {
    /// Role contains a token (`SUPERADMIN` counts as `ADMIN`)
    #[default]
    Substring,
    /// Role equals a token
    Exact,
}

/// Decides which roles carry the administrator override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminMatcher {
    tokens: Vec<String>,
    mode: AdminMatch,
}

impl AdminMatcher {
    /// Create a matcher; tokens are normalized to uppercase and blanks dropped
    pub fn new<I, S>(tokens: I, mode: AdminMatch) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        AdminMatcher {
            tokens: tokens
                .into_iter()
                .filter_map(|t| Role::new(t.as_ref()))
                .map(|r| r.0)
                .collect(),
            mode,
        }
    }

    /// Check a normalized role against the administrator tokens
    pub fn is_admin(&self, role: &Role) -> bool {
        self.tokens.iter().any(|token| match self.mode {
            AdminMatch::Substring => role.as_str().contains(token.as_str()),
            AdminMatch::Exact => role.as_str() == token,
        })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn mode(&self) -> AdminMatch {
        self.mode
    }
}

impl Default for AdminMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_ROLES, AdminMatch::Substring)
    }
}

/// Normalized set of roles held by one principal
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleSet {
    roles: Vec<Role>,
    admin: bool,
}

impl RoleSet {
    /// Parse a raw role string with the default administrator tokens
    ///
    /// # Examples
    ///
    /// ```
    /// use school_rbac::core::role::RoleSet;
    ///
    /// let roles = RoleSet::parse(" guru | Wali_Kelas,GURU ");
    /// assert_eq!(roles.names(), vec!["GURU", "WALI_KELAS"]);
    /// assert!(!roles.is_admin());
    ///
    /// assert!(RoleSet::parse("guru,admin").is_admin());
    /// ```
    pub fn parse(raw: &str) -> Self {
        Self::parse_with(raw, &AdminMatcher::default())
    }

    /// Parse a raw role string with a custom administrator matcher
    pub fn parse_with(raw: &str, admin: &AdminMatcher) -> Self {
        Self::from_roles(raw.split(&ROLE_DELIMITERS[..]), admin)
    }

    /// Build from already separated role names
    pub fn from_roles<I, S>(names: I, admin: &AdminMatcher) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roles: Vec<Role> = Vec::new();
        for role in names.into_iter().filter_map(|n| Role::new(n.as_ref())) {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        let admin = roles.iter().any(|r| admin.is_admin(r));
        RoleSet { roles, admin }
    }

    /// True when any role carries the administrator override
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Case-insensitive membership check
    pub fn contains(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.as_str().eq_ignore_ascii_case(role.trim()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }

    /// Role names in first-seen order
    pub fn names(&self) -> Vec<&str> {
        self.roles.iter().map(Role::as_str).collect()
    }

    /// Order-independent key identifying this role set
    pub fn cache_key(&self) -> String {
        let mut names = self.names();
        names.sort_unstable();
        names.join("|")
    }
}
