use serde::{Deserialize, Serialize};

use crate::settings::api_server::AuthMode;

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct ServerInfo {
    pub version: String,
    #[serde(default)]
    pub auth_mode: AuthMode,
    pub permissions: usize,
    pub roles: usize,
}
