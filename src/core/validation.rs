//! Validation for permission rule identifiers
//!
//! Rules are written by administrators through CRUD screens and config files,
//! so everything entering a rule store passes through these checks first.
//! The evaluator itself never validates: malformed input there simply denies.

use crate::error::{RbacError, Result};
use crate::iam::WILDCARD;
use regex::Regex;

/// Pattern for normalized role names ("GURU", "WALI_KELAS")
const ROLE_PATTERN: &str = r"^[A-Z0-9_-]+$";

/// Pattern for resources ("master", "master.siswa", "jurnal:guru")
const RESOURCE_PATTERN: &str = r"^[a-z0-9_]+([.:][a-z0-9_]+)*$";

/// Pattern for actions ("view", "delete", "tab:siswa")
const ACTION_PATTERN: &str = r"^[a-z0-9_]+(:[a-z0-9_]+)*$";

/// Maximum length for any single identifier
const MAX_LENGTH: usize = 128;

fn check(value: &str, pattern: &str, err: fn(String) -> RbacError) -> Result<()> {
    if value.is_empty() {
        return Err(err("identifier cannot be empty".to_string()));
    }

    if value.len() > MAX_LENGTH {
        return Err(err(format!(
            "'{}' is too long (max {} characters)",
            value, MAX_LENGTH
        )));
    }

    if value == WILDCARD {
        return Ok(());
    }

    let re = Regex::new(pattern).map_err(|e| err(e.to_string()))?;
    if !re.is_match(value) {
        return Err(err(value.to_string()));
    }

    Ok(())
}

/// Validate a role name. Expects the normalized (uppercased) form.
///
/// # Examples
///
/// ```
/// use school_rbac::core::validation::validate_role;
///
/// assert!(validate_role("WALI_KELAS").is_ok());
/// assert!(validate_role("*").is_ok());
/// assert!(validate_role("guru").is_err()); // not normalized
/// ```
pub fn validate_role(role: &str) -> Result<()> {
    check(role, ROLE_PATTERN, RbacError::InvalidRole)
}

/// Validate a hierarchical resource identifier
pub fn validate_resource(resource: &str) -> Result<()> {
    check(resource, RESOURCE_PATTERN, RbacError::InvalidResource)
}

/// Validate an action identifier
pub fn validate_action(action: &str) -> Result<()> {
    check(action, ACTION_PATTERN, RbacError::InvalidAction)
}
