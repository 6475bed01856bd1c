//! Page and route guard
//!
//! Sits in front of page loads and API handlers. For each request the guard
//! resolves the principal's roles, derives a resource from the URL path and
//! an action from the method, then consults the evaluator through a
//! per-request [`AccessContext`]. Denied page loads redirect, denied API calls
//! get a 403.

use crate::config::AccessConfig;
use crate::error::Result;
use crate::iam::{
    Decision, DecisionCache, EvaluationMode, PermissionEvaluator, PermissionRule, VIEW,
};
use crate::role::{AdminMatcher, RoleSet};
use crate::store::RuleStore;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Incoming request as seen by the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    /// Request path, may include a query string
    pub path: String,
    /// HTTP method
    pub method: String,
    /// Explicit action; derived from the method when absent
    pub action: Option<String>,
}

impl RouteRequest {
    /// A `GET` page load
    pub fn page(path: impl Into<String>) -> Self {
        RouteRequest {
            path: path.into(),
            method: "GET".to_string(),
            action: None,
        }
    }

    /// A request with an explicit method
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        RouteRequest {
            path: path.into(),
            method: method.into(),
            action: None,
        }
    }

    /// Override the derived action (e.g. `tab:siswa`)
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// Default action for an HTTP method
pub fn action_for_method(method: &str) -> &'static str {
    match method.to_ascii_uppercase().as_str() {
        "POST" => "create",
        "PUT" | "PATCH" => "update",
        "DELETE" => "delete",
        _ => VIEW,
    }
}

/// Strip `prefix` from `path` only when it ends on a segment boundary, so
/// `/app` strips from `/app/jurnal` but not from `/application`.
pub fn strip_path_prefix<'p>(path: &'p str, prefix: &str) -> Option<&'p str> {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return None;
    }
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with(&['/', '?', '#'][..]) {
        Some(rest)
    } else {
        None
    }
}

/// Derive a resource identifier from a URL path.
///
/// Query and fragment are dropped, `mount_prefix` is stripped, remaining
/// segments are lowercased, hyphens become underscores, and segments are
/// joined with `.`. The root path maps to `home`.
///
/// # Examples
///
/// ```
/// use school_rbac::core::guard::resource_for_path;
///
/// assert_eq!(resource_for_path("/Master-Data/siswa?page=2", None, "dashboard"), "master_data.siswa");
/// assert_eq!(resource_for_path("/app/jurnal", Some("/app"), "dashboard"), "jurnal");
/// assert_eq!(resource_for_path("/", None, "dashboard"), "dashboard");
/// ```
pub fn resource_for_path(path: &str, mount_prefix: Option<&str>, home: &str) -> String {
    let path = path.split(&['?', '#'][..]).next().unwrap_or_default();
    let path = mount_prefix
        .and_then(|prefix| strip_path_prefix(path, prefix))
        .unwrap_or(path);

    let segments: Vec<String> = path
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase().replace('-', "_"))
        .collect();

    if segments.is_empty() {
        return home.to_string();
    }
    segments.join(".")
}

/// Per-request authorization context
///
/// Carries the principal's roles and the rules fetched for them, so every
/// check made while handling one request (guard, menu rendering, tab
/// visibility) sees the same inputs and reports its own [`Decision`].
#[derive(Debug, Clone)]
pub struct AccessContext {
    roles: RoleSet,
    rules: Arc<[PermissionRule]>,
    evaluator: PermissionEvaluator,
}

impl AccessContext {
    pub fn new(
        roles: RoleSet,
        rules: impl Into<Arc<[PermissionRule]>>,
        mode: EvaluationMode,
    ) -> Self {
        AccessContext {
            roles,
            rules: rules.into(),
            evaluator: PermissionEvaluator::new(mode),
        }
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    pub fn is_admin(&self) -> bool {
        self.roles.is_admin()
    }

    pub fn rules(&self) -> &[PermissionRule] {
        &self.rules
    }

    /// Evaluate one check and report why
    pub fn decide(&self, resource: &str, action: &str) -> Decision {
        self.evaluator.decide(&self.roles, &self.rules, resource, action)
    }

    /// Boolean form of [`AccessContext::decide`]
    pub fn can(&self, resource: &str, action: &str) -> bool {
        self.decide(resource, action).is_allowed()
    }

    /// Tabs of a page the principal may open (`tab:<name>` actions)
    pub fn visible_tabs<'t>(&self, resource: &str, tabs: &[&'t str]) -> Vec<&'t str> {
        tabs.iter()
            .copied()
            .filter(|tab| self.can(resource, &format!("tab:{}", tab)))
            .collect()
    }
}

/// How a denial is surfaced to the requester
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialResponse {
    /// Page load: send the user elsewhere
    Redirect(String),
    /// API call: authorization error
    Forbidden,
}

impl DenialResponse {
    pub fn status_code(&self) -> u16 {
        match self {
            DenialResponse::Redirect(_) => 302,
            DenialResponse::Forbidden => 403,
        }
    }
}

impl fmt::Display for DenialResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialResponse::Redirect(to) => write!(f, "redirect to {}", to),
            DenialResponse::Forbidden => write!(f, "403 forbidden"),
        }
    }
}

/// Access was denied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Access denied: {action} on {resource} ({response})")]
pub struct AccessDenied {
    pub resource: String,
    pub action: String,
    pub response: DenialResponse,
}

/// Access was granted; the context stays usable for the rest of the request
#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub resource: String,
    pub action: String,
    pub context: AccessContext,
}

/// Guard deciding page and API access against a rule store
pub struct RouteGuard {
    store: Arc<dyn RuleStore>,
    admin: AdminMatcher,
    mode: EvaluationMode,
    cache: Option<DecisionCache>,
    default_redirect: String,
    api_prefix: String,
    mount_prefix: Option<String>,
    home_resource: String,
}

impl RouteGuard {
    /// Build a guard from configuration
    pub fn new(store: Arc<dyn RuleStore>, config: &AccessConfig) -> Self {
        RouteGuard {
            store,
            admin: config.admin_matcher(),
            mode: config.mode,
            cache: DecisionCache::new(config.cache_capacity),
            default_redirect: config.default_redirect.clone(),
            api_prefix: config.api_prefix.clone(),
            mount_prefix: config.mount_prefix.clone(),
            home_resource: config.home_resource.clone(),
        }
    }

    /// Resolve roles and fetch their rules into a request context
    pub fn context_for(&self, raw_roles: &str) -> Result<AccessContext> {
        let roles = RoleSet::parse_with(raw_roles, &self.admin);
        let rules = if roles.is_admin() {
            Vec::new()
        } else {
            self.store.rules_for_roles(&roles)?
        };
        Ok(AccessContext::new(roles, rules, self.mode))
    }

    /// Resource a path maps to under this guard's configuration.
    ///
    /// API routes share the page namespace: `/api/nilai/12` maps to
    /// `nilai.12`, so a rule on `nilai` covers both the page and its API.
    pub fn resource_for(&self, path: &str) -> String {
        let path = self.unmounted(path);
        let path = strip_path_prefix(path, &self.api_prefix).unwrap_or(path);
        resource_for_path(path, None, &self.home_resource)
    }

    /// Whether a path is an API route (403 on denial instead of a redirect)
    pub fn is_api(&self, path: &str) -> bool {
        strip_path_prefix(self.unmounted(path), &self.api_prefix).is_some()
    }

    fn unmounted<'p>(&self, path: &'p str) -> &'p str {
        self.mount_prefix
            .as_deref()
            .and_then(|prefix| strip_path_prefix(path, prefix))
            .unwrap_or(path)
    }

    /// Authorize a request for a principal with the given raw role string.
    ///
    /// Store failures deny: they surface as `AccessDenied` like any other
    /// refusal, never as a grant.
    pub fn authorize(
        &self,
        raw_roles: &str,
        request: &RouteRequest,
    ) -> std::result::Result<AccessGrant, AccessDenied> {
        let resource = self.resource_for(&request.path);
        let action = request
            .action
            .clone()
            .unwrap_or_else(|| action_for_method(&request.method).to_string());

        let denied = |resource: String, action: String| {
            let response = if self.is_api(&request.path) {
                DenialResponse::Forbidden
            } else {
                DenialResponse::Redirect(self.default_redirect.clone())
            };
            AccessDenied {
                resource,
                action,
                response,
            }
        };

        // Must be read before the rules are fetched
        let revision = self.store.revision();

        let context = match self.context_for(raw_roles) {
            Ok(context) => context,
            Err(e) => {
                info!("Denying {} on {}: rule lookup failed: {}", action, resource, e);
                return Err(denied(resource, action));
            }
        };

        let allowed = self.check_cached(revision, &context, &resource, &action);

        if allowed {
            debug!(
                "Granted {} on {} for [{}]",
                action,
                resource,
                context.roles().cache_key()
            );
            Ok(AccessGrant {
                resource,
                action,
                context,
            })
        } else {
            info!(
                "Denied {} on {} for [{}]",
                action,
                resource,
                context.roles().cache_key()
            );
            Err(denied(resource, action))
        }
    }

    fn check_cached(
        &self,
        revision: u64,
        context: &AccessContext,
        resource: &str,
        action: &str,
    ) -> bool {
        let Some(cache) = &self.cache else {
            return context.can(resource, action);
        };

        let key = context.roles().cache_key();
        if let Some(allowed) = cache.get(revision, &key, resource, action) {
            return allowed;
        }

        let decision = context.decide(resource, action);
        debug!("{} on {}: {}", action, resource, decision);
        let allowed = decision.is_allowed();
        cache.put(revision, &key, resource, action, allowed);
        allowed
    }

    /// Number of cached decisions (0 when caching is disabled)
    pub fn cached_decisions(&self) -> usize {
        self.cache.as_ref().map_or(0, DecisionCache::len)
    }
}
