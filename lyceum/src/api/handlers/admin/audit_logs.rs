use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::basic_auth::CurrentUser;
use crate::api::error::AppError;
use crate::app_state::SharedAppState;
use crate::services::audit::{AuditEntry, AuditFilter, AuditStatistics};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct AuditLogResponse {
    pub entries: Vec<AuditEntry>,
    pub total: usize,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct PurgeAuditLogsRequest {
    /// Entries recorded before this instant are dropped
    pub before: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PurgeAuditLogsResponse {
    pub purged: usize,
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/admin/audit-logs",
    params(AuditFilter),
    responses(
        (status = 200, body = AuditLogResponse),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - admin.audit required"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn list_audit_logs_handler(
    State(state): State<SharedAppState>,
    Query(filter): Query<AuditFilter>,
) -> Result<impl IntoResponse, AppError> {
    let entries = state.audit_log.list(&filter).await;
    Ok(Json(AuditLogResponse {
        total: entries.len(),
        entries,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/admin/audit-logs/statistics",
    responses(
        (status = 200, body = AuditStatistics),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - admin.audit required"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn audit_statistics_handler(
    State(state): State<SharedAppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.audit_log.statistics().await))
}

#[utoipa::path(
    post,
    path = "/api/v1/authenticated/admin/audit-logs/purge",
    request_body = PurgeAuditLogsRequest,
    responses(
        (status = 200, body = PurgeAuditLogsResponse),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - admin.settings required"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn purge_audit_logs_handler(
    State(state): State<SharedAppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<PurgeAuditLogsRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!(
        "Audit purge before {} requested by {}",
        request.before, user.email
    );
    let purged = state.audit_log.purge_before(request.before).await;
    Ok(Json(PurgeAuditLogsResponse { purged }))
}
