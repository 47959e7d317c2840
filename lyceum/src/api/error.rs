use axum::http::StatusCode;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::services::authorization::AuthorizationError;

#[derive(Clone, Error, Debug, PartialEq, Eq, utoipa::ToSchema)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission '{0}' required")]
    PermissionDenied(String),

    #[error("Identity store unavailable")]
    IdentityStoreUnavailable,

    #[error("Invalid campus id: {0}")]
    InvalidCampusId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("{0}")]
    AssignmentNotFound(String),

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    fn get_error_msg(&self) -> (StatusCode, String) {
        let status = match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::IdentityStoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InvalidCampusId(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AppError::RoleNotFound(_) => StatusCode::NOT_FOUND,
            AppError::AssignmentNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidPolicy(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string())
    }
}

impl From<AuthorizationError> for AppError {
    fn from(e: AuthorizationError) -> Self {
        match e {
            AuthorizationError::UserNotFound(user) => AppError::UserNotFound(user),
            AuthorizationError::RoleNotFound(role) => AppError::RoleNotFound(role),
            AuthorizationError::AssignmentNotFound { .. } => {
                AppError::AssignmentNotFound(e.to_string())
            }
            AuthorizationError::InvalidPolicy(msg) => AppError::InvalidPolicy(msg),
            AuthorizationError::Persistence(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        if let Some(app_error) = e.downcast_ref::<AppError>() {
            return app_error.clone();
        }
        if let Some(auth_error) = e.downcast_ref::<AuthorizationError>() {
            return auth_error.clone().into();
        }
        AppError::InternalServerError(format!("{:#}", e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.get_error_msg();
        let body = serde_json::json!({ "error": true, "message": body });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Unauthorized.get_error_msg().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::PermissionDenied("news.edit".into()).get_error_msg(),
            (
                StatusCode::FORBIDDEN,
                "Permission 'news.edit' required".to_string()
            )
        );
        assert_eq!(
            AppError::IdentityStoreUnavailable.get_error_msg().0,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_anyhow_keeps_authorization_errors() {
        let err = anyhow::Error::new(AuthorizationError::RoleNotFound("ghost".into()));
        assert_eq!(AppError::from(err), AppError::RoleNotFound("ghost".into()));

        let err = anyhow::anyhow!("disk on fire");
        assert!(matches!(
            AppError::from(err),
            AppError::InternalServerError(_)
        ));
    }
}
