use std::{fmt, sync::Arc};

use lyceum_core::authorization::IdentityStore;
use tracing::{error, info};

use crate::services::{
    audit::AuditLog, authorization::fallback::FallbackService, AuthorizationService,
};
use crate::settings::config::Settings;
use crate::stop_flag;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub stop_flag: stop_flag::StopFlag,
    pub auth_service: Arc<AuthorizationService>,
    /// Consulted by every permission check. Normally the same object as
    /// `auth_service`.
    pub identity_store: Arc<dyn IdentityStore>,
    pub audit_log: AuditLog,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("settings", &self.settings)
            .field("stop_flag", &self.stop_flag)
            .field("policy_path", &self.auth_service.config_path())
            .field("audit_log", &self.audit_log)
            .finish_non_exhaustive()
    }
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<SharedAppState> {
        let stop_flag = stop_flag::StopFlag::new();
        stop_flag::register_signal_handler(&stop_flag);

        let auth_service = Self::load_auth_service(&settings).await?;

        Ok(Self::from_parts(settings, stop_flag, Arc::new(auth_service)))
    }

    /// Load the policy file. A missing file yields the built-in catalog. A
    /// file that cannot be read or parsed is an error, unless a bootstrap
    /// admin is configured to run on the built-in catalog instead.
    pub async fn load_auth_service(settings: &Settings) -> anyhow::Result<AuthorizationService> {
        let policy_path = &settings.rbac.policy_path;
        match AuthorizationService::new(policy_path).await {
            Ok(service) => {
                info!("Authorization policy loaded from '{}'", policy_path);
                Ok(service)
            }
            Err(e) => match &settings.rbac.bootstrap_admin {
                Some(admin) => {
                    error!(
                        "Failed to load authorization policy from '{}': {:#}. Falling back to the built-in catalog with bootstrap admin '{}'.",
                        policy_path, e, admin
                    );
                    Ok(FallbackService::create_fallback_service(Some(admin.clone())).await)
                }
                None => Err(e.context(format!(
                    "Failed to load authorization policy from '{}'",
                    policy_path
                ))),
            },
        }
    }

    /// Assemble the state from an already built authorization service, which
    /// also serves as the identity store.
    pub fn from_parts(
        settings: Settings,
        stop_flag: stop_flag::StopFlag,
        auth_service: Arc<AuthorizationService>,
    ) -> SharedAppState {
        let identity_store: Arc<dyn IdentityStore> = auth_service.clone();
        let audit_log = AuditLog::new(settings.audit.max_entries);

        Arc::new(AppState {
            settings,
            stop_flag,
            auth_service,
            identity_store,
            audit_log,
        })
    }

    /// Same as [`AppState::from_parts`] but with a separate identity store.
    pub fn with_identity_store(
        settings: Settings,
        auth_service: Arc<AuthorizationService>,
        identity_store: Arc<dyn IdentityStore>,
    ) -> SharedAppState {
        let audit_log = AuditLog::new(settings.audit.max_entries);

        Arc::new(AppState {
            settings,
            stop_flag: stop_flag::StopFlag::new(),
            auth_service,
            identity_store,
            audit_log,
        })
    }
}
