//! Authorization of authenticated requests against the static permission matrix.

pub mod policy;
pub mod routes;
pub mod scope;

pub use policy::{policy_key, PermissionPolicy, PolicyError};
pub use routes::{MatchedPathResolver, RouteTemplateResolver, TemplateRouter};

use crate::decision::{AuthDecision, Principal};
use http::request::Parts;
use http::Method;
use log::{debug, error};
use std::sync::Arc;

/// Grants every permission check
pub const PERMISSION_ADMIN_ALL: &str = "admin:*";
/// Grants every read request
pub const PERMISSION_VIEW_ALL: &str = "view:*";

/// Decides whether an authenticated principal may perform a request.
///
/// Holds no mutable state; clones share the same policy.
#[derive(Clone)]
pub struct PermissionResolver {
    policy: Arc<PermissionPolicy>,
    templates: Option<Arc<dyn RouteTemplateResolver>>,
}

impl PermissionResolver {
    pub fn new(policy: Arc<PermissionPolicy>) -> Self {
        Self {
            policy,
            templates: None,
        }
    }

    /// Enables lookups by route template for parameterized routes.
    ///
    /// Without it, a request whose concrete path is not a policy key is denied.
    pub fn with_route_templates(mut self, resolver: impl RouteTemplateResolver + 'static) -> Self {
        self.templates = Some(Arc::new(resolver));
        self
    }

    pub fn resolve(&self, principal: &Principal, request: &Parts) -> AuthDecision {
        if principal.permissions.is_empty() {
            error!(
                "resolver.permissions empty permission set for user '{}'",
                principal.user_id
            );
            return AuthDecision::forbidden();
        }

        if principal.has(PERMISSION_ADMIN_ALL) {
            return AuthDecision::Allow(principal.clone());
        }

        if request.method == Method::GET && principal.has(PERMISSION_VIEW_ALL) {
            return AuthDecision::Allow(principal.clone());
        }

        let Some(allowed) = self.allowed_permissions(request) else {
            debug!(
                "No policy entry for {} {}",
                request.method,
                request.uri.path()
            );
            return AuthDecision::forbidden();
        };

        if scope::matches(allowed, &principal.permissions) {
            AuthDecision::Allow(principal.clone())
        } else {
            debug!(
                "User '{}' lacks permission for {} {}",
                principal.user_id,
                request.method,
                request.uri.path()
            );
            AuthDecision::forbidden()
        }
    }

    /// Policy entry of a request: by exact path first, then by route template
    pub fn allowed_permissions(&self, request: &Parts) -> Option<&[String]> {
        if let Some(allowed) = self.policy.allowed(&request.method, request.uri.path()) {
            return Some(allowed);
        }

        let template = self.templates.as_ref()?.route_template(request)?;
        self.policy.allowed(&request.method, &template)
    }
}
