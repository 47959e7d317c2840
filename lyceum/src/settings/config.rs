use config::{Config, ConfigError, Environment, File};
use lyceum_core::settings::api_server::ApiServer;
use serde::Deserialize;
use std::env;

pub const DEFAULT_POLICY_PATH: &str = "config/rbac/policy.yaml";
pub const DEFAULT_AUDIT_MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Deserialize, Clone)]
#[allow(unused)]
#[readonly::make]
pub struct RbacSettings {
    pub policy_path: String,
    /// When the policy file cannot be read or parsed, the server starts on
    /// the built-in catalog with this user as global super-admin instead of
    /// refusing to start.
    pub bootstrap_admin: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[allow(unused)]
#[readonly::make]
pub struct AuditSettings {
    pub max_entries: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[allow(unused)]
pub struct Settings {
    pub debug: bool,
    pub api: ApiServer,
    pub rbac: RbacSettings,
    pub audit: AuditSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            debug: false,
            api: ApiServer::default(),
            rbac: RbacSettings {
                policy_path: DEFAULT_POLICY_PATH.to_string(),
                bootstrap_admin: None,
            },
            audit: AuditSettings {
                max_entries: DEFAULT_AUDIT_MAX_ENTRIES,
            },
        }
    }
}

impl Settings {
    pub fn get_environment() -> Environment {
        Environment::default()
            .prefix("LYCEUM")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("LYCEUM_RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Self::with_defaults(Config::builder())?
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Self::get_environment());

        let mut settings: Settings = builder.build()?.try_deserialize()?;

        // Lets an environment variable switch off a bootstrap admin set in a file
        settings.rbac.bootstrap_admin = settings.check_if_optional(&settings.rbac.bootstrap_admin);

        Ok(settings)
    }

    /// Built-in defaults, shared with tests that load their own files.
    pub fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("debug", false)?
            .set_default("api.bind_address", "0.0.0.0:21450")?
            .set_default("rbac.policy_path", DEFAULT_POLICY_PATH)?
            .set_default("audit.max_entries", DEFAULT_AUDIT_MAX_ENTRIES as u64)
    }

    fn check_if_optional(&self, s: &Option<String>) -> Option<String> {
        match s {
            None => None,
            Some(s) => match s.to_lowercase().as_str() {
                "" | "no" | "false" | "0" => None,
                _ => Some(s.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyceum_core::settings::api_server::AuthMode;
    use std::env;

    fn load_test_settings() -> Settings {
        let builder = Settings::with_defaults(Config::builder())
            .unwrap()
            .add_source(config::File::with_name("tests/test_bearer_auth.yaml"))
            .add_source(Settings::get_environment());

        builder.build().unwrap().try_deserialize().unwrap()
    }

    #[test]
    fn test_settings_from_file() {
        let settings = load_test_settings();

        assert!(matches!(settings.api.auth_mode, AuthMode::Bearer));
        assert_eq!(
            settings.api.bearer_tokens.get("admin@lyceum.test").map(String::as_str),
            Some("admin-token")
        );
        assert_eq!(settings.rbac.policy_path, "tests/fixtures/policy.yaml");
        assert_eq!(settings.audit.max_entries, 500);
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let builder = Settings::with_defaults(Config::builder())
            .unwrap()
            .add_source(config::File::from_str(
                "api:\n  auth_mode: dev\n",
                config::FileFormat::Yaml,
            ));
        let settings: Settings = builder.build().unwrap().try_deserialize().unwrap();

        assert_eq!(settings.api.bind_address, "0.0.0.0:21450");
        assert!(matches!(settings.api.auth_mode, AuthMode::Development));
        assert_eq!(settings.rbac.policy_path, DEFAULT_POLICY_PATH);
        assert_eq!(settings.audit.max_entries, DEFAULT_AUDIT_MAX_ENTRIES);
    }

    #[test]
    fn test_bootstrap_admin_from_env() {
        env::set_var("LYCEUM__RBAC__BOOTSTRAP_ADMIN", "root@lyceum.test");

        let settings = load_test_settings();
        assert_eq!(
            settings.rbac.bootstrap_admin.as_deref(),
            Some("root@lyceum.test")
        );

        env::remove_var("LYCEUM__RBAC__BOOTSTRAP_ADMIN");
    }

    #[test]
    fn test_check_if_optional() {
        let settings = Settings::default();
        assert_eq!(settings.check_if_optional(&Some("false".to_string())), None);
        assert_eq!(settings.check_if_optional(&Some("".to_string())), None);
        assert_eq!(
            settings.check_if_optional(&Some("root@lyceum.test".to_string())),
            Some("root@lyceum.test".to_string())
        );
    }
}
