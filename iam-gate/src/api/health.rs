use crate::state::AppState;
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

/// Liveness of the gate itself; the IAM backend is not contacted
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
