use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::app_state::SharedAppState;
use lyceum_core::settings::api_server::DEFAULT_DEV_USER_EMAIL;

/// The authenticated principal, inserted as a request extension.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    /// Principal identifier as used in the policy file
    pub email: String,
    pub name: String,
}

/// Create a development mode user
pub fn authenticate_dev_user(state: &SharedAppState) -> CurrentUser {
    CurrentUser {
        email: state
            .settings
            .api
            .dev_user_email
            .clone()
            .unwrap_or_else(|| DEFAULT_DEV_USER_EMAIL.to_string()),
        name: state
            .settings
            .api
            .dev_user_name
            .clone()
            .unwrap_or_else(|| "Dev User".to_string()),
    }
}

/// Authenticate a bearer token.
///
/// The token is reverse-looked-up in `api.bearer_tokens`; the identifier it
/// maps to must be a known, active user in the policy. Accepts the raw token
/// with or without the `Bearer ` prefix.
pub async fn authorize_bearer_user(state: &SharedAppState, token: &str) -> Option<CurrentUser> {
    let raw_token = token.strip_prefix("Bearer ").unwrap_or(token);

    let Some(identifier) = find_token_identifier(state, raw_token) else {
        warn!(
            "Bearer token authentication failed - token not found in bearer_tokens configuration (token starts with: {}...)",
            raw_token.chars().take(4).collect::<String>()
        );
        return None;
    };
    debug!("Found identifier '{}' for bearer token", identifier);

    match state.auth_service.get_user(&identifier).await {
        Some(user) if user.active => Some(CurrentUser {
            email: identifier,
            name: user.name,
        }),
        Some(_) => {
            warn!(
                "Bearer token authentication failed - user '{}' is inactive",
                identifier
            );
            None
        }
        None => {
            warn!(
                "Bearer token authentication failed - identifier '{}' not found in policy",
                identifier
            );
            None
        }
    }
}

/// Find the identifier a token belongs to, comparing in constant time.
fn find_token_identifier(state: &SharedAppState, token: &str) -> Option<String> {
    state
        .settings
        .api
        .bearer_tokens
        .iter()
        .find(|(_, configured)| bool::from(token.as_bytes().ct_eq(configured.as_bytes())))
        .map(|(identifier, _)| identifier.clone())
}
