use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use lyceum_core::authorization::{authorize, CampusId};
use serde::Deserialize;
use std::{future::Future, pin::Pin};
use tracing::{error, warn};

use crate::{api::basic_auth::CurrentUser, api::error::AppError, app_state::SharedAppState};

pub const CAMPUS_QUERY_PARAM: &str = "campus_id";
pub const CAMPUS_HEADER: &str = "x-campus-id";

#[derive(Debug, Deserialize)]
struct CampusQuery {
    campus_id: Option<String>,
}

type PermissionFuture = Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>;

/// Middleware factory that denies requests unless the current user holds
/// `permission` for the campus the request targets.
///
/// Every decision is written to the audit log. A failing identity store
/// yields 503 rather than a denial.
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(State<SharedAppState>, Request, Next) -> PermissionFuture + Clone + Send + Sync + 'static
{
    move |State(state): State<SharedAppState>, req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .cloned()
                .ok_or_else(|| {
                    warn!("No authenticated user found for permission '{}'", permission);
                    AppError::Unauthorized
                })?;

            let campus = extract_target_campus(&req)?;
            let path = req.uri().path().to_string();

            let decision = authorize(
                state.identity_store.as_ref(),
                &user.email,
                permission,
                campus,
            )
            .await
            .map_err(|e| {
                error!(
                    "Identity store failed while checking '{}' for {}: {:#}",
                    permission, user.email, e
                );
                AppError::IdentityStoreUnavailable
            })?;

            state
                .audit_log
                .record(&user.email, permission, campus, &decision, Some(&path))
                .await;

            if !decision.is_allowed() {
                return Err(AppError::PermissionDenied(permission.to_string()));
            }

            Ok(next.run(req).await)
        })
    }
}

/// The campus a request targets: the `campus_id` query parameter, else the
/// `x-campus-id` header, else none.
pub fn extract_target_campus(req: &Request) -> Result<Option<CampusId>, AppError> {
    let Query(query) = Query::<CampusQuery>::try_from_uri(req.uri())
        .map_err(|e| AppError::InvalidCampusId(e.body_text()))?;

    if let Some(value) = query.campus_id.as_deref() {
        return parse_campus_id(Some(value));
    }

    match req.headers().get(CAMPUS_HEADER) {
        Some(header) => {
            let value = header
                .to_str()
                .map_err(|_| AppError::InvalidCampusId("non-ASCII header value".to_string()))?;
            parse_campus_id(Some(value))
        }
        None => Ok(None),
    }
}

/// Parse an optional campus id; blank values count as absent.
pub fn parse_campus_id(value: Option<&str>) -> Result<Option<CampusId>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<CampusId>()
            .map(Some)
            .map_err(|_| AppError::InvalidCampusId(raw.to_string())),
    }
}
