use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_DEV_USER_EMAIL: &str = "dev@localhost";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub enum AuthMode {
    #[serde(rename = "dev")]
    Development,
    #[serde(rename = "bearer")]
    #[default]
    Bearer,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Development => "dev",
            AuthMode::Bearer => "bearer",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[allow(unused)]
#[readonly::make]
pub struct ApiServer {
    pub bind_address: String,
    #[serde(default)]
    pub auth_mode: AuthMode,
    pub dev_user_email: Option<String>,
    pub dev_user_name: Option<String>,
    /// Maps a user identifier (the email used in the policy file) to its token.
    #[serde(default)]
    pub bearer_tokens: HashMap<String, String>,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ApiServer {
    fn default() -> Self {
        ApiServer {
            bind_address: "0.0.0.0:21450".to_string(),
            auth_mode: AuthMode::default(),
            dev_user_email: Some(DEFAULT_DEV_USER_EMAIL.to_string()),
            dev_user_name: Some("Dev User".to_string()),
            bearer_tokens: HashMap::new(),
            cors_origins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_mode_names() {
        let mode: AuthMode = serde_json::from_str("\"dev\"").unwrap();
        assert_eq!(mode, AuthMode::Development);
        assert_eq!(AuthMode::default().as_str(), "bearer");
    }

    #[test]
    fn test_api_server_defaults_when_optional_fields_missing() {
        let api: ApiServer = serde_json::from_value(serde_json::json!({
            "bind_address": "127.0.0.1:9000"
        }))
        .unwrap();
        assert_eq!(api.auth_mode, AuthMode::Bearer);
        assert!(api.bearer_tokens.is_empty());
        assert!(api.dev_user_email.is_none());
    }
}
