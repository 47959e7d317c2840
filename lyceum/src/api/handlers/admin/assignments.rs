use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use lyceum_core::authorization::{
    catalog::USERS_ROLES, evaluate, highest_level_on, AccessDecision, CampusId,
    EffectivePermissions, IdentityStore, SUPER_ADMIN_LEVEL,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::api::basic_auth::CurrentUser;
use crate::api::error::AppError;
use crate::api::middleware::authorization::parse_campus_id;
use crate::app_state::SharedAppState;
use crate::services::authorization::types::Assignment;

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserAssignmentsResponse {
    pub user_id: String,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UserPermissionsResponse {
    pub user_id: String,
    pub permissions: EffectivePermissions,
}

/// Grant or revoke a role, globally or on one campus
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[schema(example = json!({
    "role": "editor",
    "campus_id": "6f1c1e9a-2d7b-4f43-9a3e-0c5a1b2d3e4f"
}))]
pub struct RoleAssignmentRequest {
    /// Role code (must exist in the policy)
    pub role: String,
    /// Omit for a global assignment
    pub campus_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/admin/users/{user_id}/roles",
    params(
        ("user_id" = String, Path, description = "User email")
    ),
    responses(
        (status = 200, body = UserAssignmentsResponse),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - users.view required"),
        (status = 404, description = "User not found"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_user_roles_handler(
    State(state): State<SharedAppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let assignments = state.auth_service.get_user_assignments(&user_id).await?;
    Ok(Json(UserAssignmentsResponse {
        user_id,
        assignments,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/admin/users/{user_id}/permissions",
    params(
        ("user_id" = String, Path, description = "User email")
    ),
    responses(
        (status = 200, body = UserPermissionsResponse),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - users.view required"),
        (status = 404, description = "User not found"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_user_permissions_handler(
    State(state): State<SharedAppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = state.auth_service.get_user_permissions(&user_id).await?;
    Ok(Json(UserPermissionsResponse {
        user_id,
        permissions,
    }))
}

/// The caller must hold `users.roles` on the campus the assignment targets,
/// not only on the campus the request was routed through. Apart from
/// super-admins, a caller only manages roles ranked below their own highest
/// role on that campus.
async fn ensure_can_manage(
    state: &SharedAppState,
    user: &CurrentUser,
    role_level: u8,
    campus: Option<CampusId>,
) -> Result<(), AppError> {
    let assignments = state
        .identity_store
        .resolve_assignments(&user.email)
        .await
        .map_err(|e| {
            error!("Identity store failed for {}: {:#}", user.email, e);
            AppError::IdentityStoreUnavailable
        })?
        .unwrap_or_default();

    match evaluate(&assignments, USERS_ROLES, campus) {
        AccessDecision::SuperAdmin { .. } => Ok(()),
        AccessDecision::Granted { .. } => {
            let own_level = highest_level_on(&assignments, campus);
            if role_level >= own_level {
                warn!(
                    "User {} (level {}) may not manage a level {} role on campus {:?}",
                    user.email, own_level, role_level, campus
                );
                return Err(AppError::PermissionDenied(USERS_ROLES.to_string()));
            }
            Ok(())
        }
        AccessDecision::Denied => {
            warn!(
                "User {} may not manage role assignments on campus {:?}",
                user.email, campus
            );
            Err(AppError::PermissionDenied(USERS_ROLES.to_string()))
        }
    }
}

fn validate_request(request: &RoleAssignmentRequest) -> Result<(), AppError> {
    if request.role.trim().is_empty() {
        return Err(AppError::InvalidInput("Role cannot be empty".to_string()));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v1/authenticated/admin/users/{user_id}/roles",
    params(
        ("user_id" = String, Path, description = "User email")
    ),
    request_body = RoleAssignmentRequest,
    responses(
        (status = 200, body = UserAssignmentsResponse),
        (status = 400, description = "Invalid request data"),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "users.roles on the target campus and a higher ranked role required"),
        (status = 404, description = "User or role not found"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn assign_role_handler(
    State(state): State<SharedAppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<String>,
    Json(request): Json<RoleAssignmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_request(&request)?;
    let campus = parse_campus_id(request.campus_id.as_deref())?;
    let role = state
        .auth_service
        .get_role(&request.role)
        .await
        .ok_or_else(|| AppError::RoleNotFound(request.role.clone()))?;
    ensure_can_manage(&state, &user, role.hierarchy_level, campus).await?;

    info!(
        "Admin {} assigning role '{}' to user '{}'",
        user.email, request.role, user_id
    );

    let assignments = state
        .auth_service
        .assign_user_role(&user_id, &request.role, campus, Some(&user.email))
        .await?;

    Ok(Json(UserAssignmentsResponse {
        user_id,
        assignments,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/authenticated/admin/users/{user_id}/roles",
    params(
        ("user_id" = String, Path, description = "User email")
    ),
    request_body = RoleAssignmentRequest,
    responses(
        (status = 200, body = UserAssignmentsResponse),
        (status = 400, description = "Invalid request data"),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "users.roles on the target campus and a higher ranked role required"),
        (status = 404, description = "User or assignment not found"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn revoke_role_handler(
    State(state): State<SharedAppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<String>,
    Json(request): Json<RoleAssignmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_request(&request)?;
    let campus = parse_campus_id(request.campus_id.as_deref())?;
    // Assignments of roles no longer in the policy are left to super-admins
    let role_level = state
        .auth_service
        .get_role(&request.role)
        .await
        .map_or(SUPER_ADMIN_LEVEL, |role| role.hierarchy_level);
    ensure_can_manage(&state, &user, role_level, campus).await?;

    info!(
        "Admin {} revoking role '{}' from user '{}'",
        user.email, request.role, user_id
    );

    let assignments = state
        .auth_service
        .revoke_user_role(&user_id, &request.role, campus)
        .await?;

    Ok(Json(UserAssignmentsResponse {
        user_id,
        assignments,
    }))
}
