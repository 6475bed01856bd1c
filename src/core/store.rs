//! Permission rule storage
//!
//! The web application keeps rules in a database table with a unique key on
//! `(role, resource, action)`. [`RuleStore`] is the contract the guard reads
//! through; [`MemoryRuleStore`] implements it in-process with the same upsert
//! semantics, for tests, the CLI and small deployments that load rules from
//! a JSON file.

use crate::error::{RbacError, Result};
use crate::iam::PermissionRule;
use crate::role::RoleSet;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Source of permission rules
pub trait RuleStore: Send + Sync {
    /// Every rule whose role is held by `roles` or is `*`
    fn rules_for_roles(&self, roles: &RoleSet) -> Result<Vec<PermissionRule>>;

    /// Insert a rule, replacing the allow flag of an existing
    /// `(role, resource, action)` entry
    fn upsert(&self, rule: PermissionRule) -> Result<()>;

    /// Remove a rule; returns whether it existed
    fn remove(&self, role: &str, resource: &str, action: &str) -> Result<bool>;

    /// All rules, ordered by key
    fn all(&self) -> Result<Vec<PermissionRule>>;

    /// Counter bumped on every mutation, used to invalidate caches
    fn revision(&self) -> u64;
}

/// Unique key of a stored rule
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct RuleKey {
    role: String,
    resource: String,
    action: String,
}

impl RuleKey {
    fn new(role: &str, resource: &str, action: &str) -> Self {
        RuleKey {
            role: role.trim().to_uppercase(),
            resource: resource.to_string(),
            action: action.to_string(),
        }
    }

    fn into_rule(self, is_allowed: bool) -> PermissionRule {
        PermissionRule {
            role: self.role,
            resource: self.resource,
            action: self.action,
            is_allowed,
        }
    }
}

/// In-memory rule store
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: RwLock<BTreeMap<RuleKey, bool>>,
    revision: AtomicU64,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a rule list; later duplicates replace earlier ones
    pub fn from_rules(rules: impl IntoIterator<Item = PermissionRule>) -> Result<Self> {
        let store = Self::new();
        for rule in rules {
            store.upsert(rule)?;
        }
        Ok(store)
    }

    /// Parse a JSON array of rules
    pub fn from_json(json: &str) -> Result<Self> {
        let rules = PermissionRule::list_from_json(json)?;
        Self::from_rules(rules)
    }

    /// Load a JSON rule file
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RbacError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json(&json)?;
        info!("Loaded {} permission rules from {:?}", store.len(), path);
        Ok(store)
    }

    /// Serialize all rules as a JSON array
    pub fn to_json(&self) -> Result<String> {
        let rules = self.all()?;
        Ok(PermissionRule::list_to_json(&rules)?)
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}

impl RuleStore for MemoryRuleStore {
    fn rules_for_roles(&self, roles: &RoleSet) -> Result<Vec<PermissionRule>> {
        let rules = self.rules.read();
        Ok(rules
            .iter()
            .filter(|(key, _)| key.role == "*" || roles.contains(&key.role))
            .map(|(key, allowed)| key.clone().into_rule(*allowed))
            .collect())
    }

    fn upsert(&self, rule: PermissionRule) -> Result<()> {
        let key = RuleKey::new(&rule.role, &rule.resource, &rule.action);
        key.clone().into_rule(rule.is_allowed).validate()?;

        debug!(
            "Upserting rule {}/{}/{} allowed={}",
            key.role, key.resource, key.action, rule.is_allowed
        );
        self.rules.write().insert(key, rule.is_allowed);
        self.revision.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, role: &str, resource: &str, action: &str) -> Result<bool> {
        let key = RuleKey::new(role, resource, action);
        let removed = self.rules.write().remove(&key).is_some();
        if removed {
            debug!("Removed rule {}/{}/{}", key.role, key.resource, key.action);
            self.revision.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }

    fn all(&self) -> Result<Vec<PermissionRule>> {
        let rules = self.rules.read();
        Ok(rules
            .iter()
            .map(|(key, allowed)| key.clone().into_rule(*allowed))
            .collect())
    }

    fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }
}
