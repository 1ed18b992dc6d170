pub(crate) mod admin;
pub(crate) mod health;
pub(crate) mod me;

use crate::middleware::{authenticate, authenticate_access_key, authorize};
use crate::state::AppState;
use axum::{middleware, Router};

/// Combines all API routes into a single router
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(protected_routes(state))
}

/// Routes that require an authenticated and authorized caller
fn protected_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .merge(me::router())
        .merge(admin::router())
        // route_layer keeps MatchedPath available to the resolver and leaves
        // unknown paths to the default 404
        .route_layer(middleware::from_fn_with_state(
            state.resolver.clone(),
            authorize,
        ));

    if state.config.session.access_key_only {
        router.route_layer(middleware::from_fn_with_state(
            state.gateway.clone(),
            authenticate_access_key,
        ))
    } else {
        router.route_layer(middleware::from_fn_with_state(
            state.gateway.clone(),
            authenticate,
        ))
    }
}
