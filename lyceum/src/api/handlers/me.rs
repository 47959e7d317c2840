use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use lyceum_core::authorization::{authorize, AccessDecision, CampusId, EffectivePermissions};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::api::basic_auth::CurrentUser;
use crate::api::error::AppError;
use crate::api::middleware::authorization::parse_campus_id;
use crate::app_state::SharedAppState;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct MyPermissionsResponse {
    pub email: String,
    pub name: String,
    pub permissions: EffectivePermissions,
}

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccessQuery {
    /// Permission code, e.g. `news.edit`
    pub permission: String,
    /// Campus the action would target
    pub campus_id: Option<String>,
}

/// Outcome of a single permission check.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct AccessCheckResponse {
    pub user_id: String,
    pub permission: String,
    pub campus_id: Option<CampusId>,
    pub allowed: bool,
    pub reason: String,
    pub decision: AccessDecision,
}

/// Run a check through the identity store, mapping store failures to 503.
pub async fn check_access(
    state: &SharedAppState,
    user_id: &str,
    permission: &str,
    campus: Option<CampusId>,
) -> Result<AccessCheckResponse, AppError> {
    let decision = authorize(state.identity_store.as_ref(), user_id, permission, campus)
        .await
        .map_err(|e| {
            error!("Identity store failed for {}: {:#}", user_id, e);
            AppError::IdentityStoreUnavailable
        })?;

    Ok(AccessCheckResponse {
        user_id: user_id.to_string(),
        permission: permission.to_string(),
        campus_id: campus,
        allowed: decision.is_allowed(),
        reason: decision.reason(),
        decision,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/me/permissions",
    responses(
        (status = 200, body = MyPermissionsResponse),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 404, description = "Authenticated user has no policy entry"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn my_permissions_handler(
    State(state): State<SharedAppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = state.auth_service.get_user_permissions(&user.email).await?;

    Ok(Json(MyPermissionsResponse {
        email: user.email,
        name: user.name,
        permissions,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/me/can",
    params(AccessQuery),
    responses(
        (status = 200, body = AccessCheckResponse),
        (status = 400, description = "Malformed campus id"),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 503, description = "Identity store unavailable"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn my_access_handler(
    State(state): State<SharedAppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<AccessQuery>,
) -> Result<impl IntoResponse, AppError> {
    let campus = parse_campus_id(query.campus_id.as_deref())?;
    let response = check_access(&state, &user.email, &query.permission, campus).await?;
    Ok(Json(response))
}
