use chrono::Utc;
use lyceum_core::authorization::catalog::SUPER_ADMIN;
use maplit::btreemap;
use tracing::{info, warn};

use super::config::ConfigManager;
use super::service::AuthorizationService;
use super::types::{Assignment, UserConfig};

/// Fallback authorization service creation
pub struct FallbackService;

impl FallbackService {
    /// Create an in-memory authorization service holding the built-in
    /// catalog. The optional bootstrap admin receives a global super-admin
    /// assignment so the system stays administrable.
    pub async fn create_fallback_service(bootstrap_admin: Option<String>) -> AuthorizationService {
        let mut config = ConfigManager::default_config();

        match bootstrap_admin {
            Some(email) if !email.trim().is_empty() => {
                info!("Granting bootstrap admin '{}' the super-admin role", email);
                config.users = btreemap! {
                    email.clone() => UserConfig {
                        assignments: vec![Assignment {
                            role: SUPER_ADMIN.to_string(),
                            campus: None,
                            assigned_at: Utc::now(),
                            assigned_by: None,
                        }],
                        ..UserConfig::new("Bootstrap Admin")
                    },
                };
            }
            _ => warn!("Fallback authorization has no users, every check will be denied"),
        }

        info!("Fallback authorization service created with built-in catalog");

        AuthorizationService::new_from_config(config, None)
    }
}
