//! axum adapters for the gateways and the permission resolver.
//!
//! Layer `authorize` inside `authenticate` with `Router::route_layer`, so the
//! principal exists before authorization runs and axum's `MatchedPath` is
//! available for template lookups:
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/things/{id}/activate", post(activate))
//!     .route_layer(from_fn_with_state(resolver, authorize))
//!     .route_layer(from_fn_with_state(gateway, authenticate))
//! ```

use crate::decision::{AuthDecision, Principal};
use crate::gateway::{AuthenticationGateway, SimpleAuthenticationGateway};
use crate::permissions::PermissionResolver;
use axum::body::Body;
use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::request::Parts;
use http::StatusCode;
use log::error;

pub async fn authenticate(
    State(gateway): State<AuthenticationGateway>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let decision = gateway.authenticate(&parts).await;
    proceed(decision, parts, body, next).await
}

/// Same as [`authenticate`] but only accepts access keys
pub async fn authenticate_access_key(
    State(gateway): State<AuthenticationGateway>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let decision = gateway.authenticate_access_key_only(&parts).await;
    proceed(decision, parts, body, next).await
}

pub async fn authenticate_simple(
    State(gateway): State<SimpleAuthenticationGateway>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let decision = gateway.authenticate(&parts).await;
    proceed(decision, parts, body, next).await
}

/// Checks the principal left by an authentication layer against the permission matrix
pub async fn authorize(
    State(resolver): State<PermissionResolver>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let Some(principal) = parts.extensions.get::<Principal>() else {
        error!(
            "authorize.principal no principal for {} {}, is the authentication layer missing?",
            parts.method,
            parts.uri.path()
        );
        return AuthDecision::forbidden().into_response();
    };

    match resolver.resolve(principal, &parts) {
        AuthDecision::Allow(_) => next.run(Request::from_parts(parts, body)).await,
        decision => decision.into_response(),
    }
}

/// Runs the rest of the stack on `Allow` with the principal attached, renders
/// any other decision instead
async fn proceed(decision: AuthDecision, mut parts: Parts, body: Body, next: Next) -> Response {
    match decision {
        AuthDecision::Allow(principal) => {
            parts.extensions.insert(principal);
            next.run(Request::from_parts(parts, body)).await
        }
        decision => decision.into_response(),
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Principal>().cloned().ok_or_else(|| {
            error!("extract.principal handler is not behind an authentication layer");
            StatusCode::FORBIDDEN
        })
    }
}
