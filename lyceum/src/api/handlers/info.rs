use axum::{debug_handler, extract::State, response::IntoResponse, Json};
use lyceum_core::api::ServerInfo;

use crate::app_state::SharedAppState;

#[utoipa::path(
    get,
    path = "/api/v1/info",
    responses(
    (status = 200, body = ServerInfo, description = "Some global info of the running server.")
    )
)]
#[debug_handler]
pub async fn info_handler(State(state): State<SharedAppState>) -> impl IntoResponse {
    Json(ServerInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        auth_mode: state.settings.api.auth_mode.clone(),
        permissions: state.auth_service.permission_count().await,
        roles: state.auth_service.role_count().await,
    })
}
