use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use lyceum_core::authorization::Permission;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::basic_auth::CurrentUser;
use crate::api::error::AppError;
use crate::api::handlers::me::{check_access, AccessCheckResponse};
use crate::api::middleware::authorization::parse_campus_id;
use crate::app_state::SharedAppState;
use crate::services::authorization::PermissionMatrix;

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PermissionListQuery {
    pub category: Option<String>,
    /// Case-insensitive match on code or label
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PermissionListResponse {
    pub permissions: Vec<Permission>,
    pub total: usize,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct PermissionCheckRequest {
    pub user_id: String,
    pub permission: String,
    pub campus_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/admin/permissions",
    params(PermissionListQuery),
    responses(
        (status = 200, body = PermissionListResponse),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - users.view required"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn list_permissions_handler(
    State(state): State<SharedAppState>,
    Query(query): Query<PermissionListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut permissions = state
        .auth_service
        .list_permissions(query.category.as_deref())
        .await;

    if let Some(search) = query.search.as_deref().map(str::to_lowercase) {
        permissions.retain(|p| {
            p.code.as_str().to_lowercase().contains(&search)
                || p.label.to_lowercase().contains(&search)
        });
    }

    Ok(Json(PermissionListResponse {
        total: permissions.len(),
        permissions,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/admin/permissions/matrix",
    responses(
        (status = 200, body = PermissionMatrix),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - users.view required"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn permission_matrix_handler(
    State(state): State<SharedAppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.auth_service.permission_matrix().await))
}

#[utoipa::path(
    post,
    path = "/api/v1/authenticated/admin/permissions/check",
    request_body = PermissionCheckRequest,
    responses(
        (status = 200, body = AccessCheckResponse),
        (status = 400, description = "Malformed campus id"),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - users.view required"),
        (status = 404, description = "User not found"),
        (status = 503, description = "Identity store unavailable"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn check_permission_handler(
    State(state): State<SharedAppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<PermissionCheckRequest>,
) -> Result<impl IntoResponse, AppError> {
    let campus = parse_campus_id(request.campus_id.as_deref())?;

    if state.auth_service.get_user(&request.user_id).await.is_none() {
        return Err(AppError::UserNotFound(request.user_id));
    }

    info!(
        "Admin {} checking '{}' for user {}",
        user.email, request.permission, request.user_id
    );

    let response = check_access(&state, &request.user_id, &request.permission, campus).await?;
    Ok(Json(response))
}
