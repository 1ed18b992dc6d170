use crate::decision::Principal;
use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::info;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ActionLog {
    pub service_id: String,
    pub viewer: String,
    pub entries: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Activation {
    pub id: u64,
    pub active: bool,
    pub activated_by: String,
}

async fn action_log(State(state): State<AppState>, principal: Principal) -> Json<ActionLog> {
    Json(ActionLog {
        service_id: state.config.service_id.clone(),
        viewer: principal.user_id,
        entries: Vec::new(),
    })
}

async fn activate_auth_service(
    Path(id): Path<String>,
    principal: Principal,
) -> Result<Json<Activation>, ApiError> {
    let id = id
        .parse::<u64>()
        .map_err(|_| ApiError::bad_request(format!("Invalid auth service id '{id}'")))?;

    info!("Auth service {id} activated by '{}'", principal.user_id);
    Ok(Json(Activation {
        id,
        active: true,
        activated_by: principal.user_id,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/admin/actionLog", get(action_log))
        .route(
            "/api/v1/admin/auth-services/{id}/activate",
            post(activate_auth_service),
        )
}
