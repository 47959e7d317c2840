use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::basic_auth::CurrentUser;
use crate::api::error::AppError;
use crate::app_state::SharedAppState;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PolicyReloadResponse {
    pub permissions: usize,
    pub roles: usize,
}

#[utoipa::path(
    post,
    path = "/api/v1/authenticated/admin/policy/reload",
    responses(
        (status = 200, body = PolicyReloadResponse),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - settings.edit required"),
        (status = 422, description = "Policy file is invalid, the previous policy stays active"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn reload_policy_handler(
    State(state): State<SharedAppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    info!("Policy reload requested by {}", user.email);

    state.auth_service.reload().await.map_err(|e| {
        warn!("Policy reload failed: {:#}", e);
        AppError::InvalidPolicy(format!("{:#}", e))
    })?;

    Ok(Json(PolicyReloadResponse {
        permissions: state.auth_service.permission_count().await,
        roles: state.auth_service.role_count().await,
    }))
}
