use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use lyceum_core::authorization::Role;
use serde::{Deserialize, Serialize};

use crate::{api::error::AppError, app_state::SharedAppState};

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoleListQuery {
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct RolesListResponse {
    pub roles: Vec<Role>,
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/admin/roles",
    params(RoleListQuery),
    responses(
        (status = 200, body = RolesListResponse),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - users.view required"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn list_roles_handler(
    State(state): State<SharedAppState>,
    Query(query): Query<RoleListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let roles = state.auth_service.list_roles(query.active).await;
    Ok(Json(RolesListResponse { roles }))
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/admin/roles/{role}",
    params(
        ("role" = String, Path, description = "Role code")
    ),
    responses(
        (status = 200, body = Role),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - users.view required"),
        (status = 404, description = "Role not found"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_role_handler(
    State(state): State<SharedAppState>,
    Path(role): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth_service
        .get_role(&role)
        .await
        .map(Json)
        .ok_or(AppError::RoleNotFound(role))
}
