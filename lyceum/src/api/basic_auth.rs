use axum::{
    extract::{Request, State},
    http,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::api::auth_core::{authenticate_dev_user, authorize_bearer_user};
use crate::api::error::AppError;
use crate::app_state::SharedAppState;

pub use crate::api::auth_core::CurrentUser;
use lyceum_core::settings::api_server::AuthMode;

pub async fn auth(
    State(state): State<SharedAppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current_user = match state.settings.api.auth_mode {
        AuthMode::Development => {
            debug!("Using development auth mode");
            Some(authenticate_dev_user(&state))
        }
        AuthMode::Bearer => {
            let auth_header = req
                .headers()
                .get(http::header::AUTHORIZATION)
                .and_then(|header| header.to_str().ok());

            let Some(auth_header) = auth_header else {
                warn!(
                    "Missing Authorization header | {} {}",
                    req.method(),
                    req.uri()
                );
                return Err(AppError::Unauthorized);
            };

            authorize_bearer_user(&state, auth_header).await
        }
    };

    match current_user {
        Some(user) => {
            debug!("User authenticated: {} <{}>", user.name, user.email);
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        None => {
            warn!(
                "Authentication failed for {} {} | auth_mode: {}",
                req.method(),
                req.uri(),
                state.settings.api.auth_mode.as_str()
            );
            Err(AppError::Unauthorized)
        }
    }
}
