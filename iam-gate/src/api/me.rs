use crate::decision::Principal;
use crate::state::AppState;
use axum::{routing::get, Json, Router};

/// The authenticated caller as the gate sees it
async fn me(principal: Principal) -> Json<Principal> {
    Json(principal)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/me", get(me))
}
