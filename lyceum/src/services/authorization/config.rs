use anyhow::{Context, Result};
use lyceum_core::authorization::catalog::{default_permissions, default_roles};
use std::path::Path;
use tracing::warn;

use super::types::{AuthorizationError, PermissionConfig, PolicyConfig, RoleConfig};

/// Loading, validating and saving of the policy file
pub struct ConfigManager;

impl ConfigManager {
    /// Load the policy from a YAML file, falling back to the built-in catalog
    /// when the file does not exist.
    pub async fn load_config(path: &str) -> Result<PolicyConfig> {
        if !Path::new(path).exists() {
            warn!("Policy file not found at {}, using built-in catalog", path);
            return Ok(Self::default_config());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .context("Failed to read policy file")?;

        let config: PolicyConfig =
            serde_norway::from_str(&content).context("Failed to parse policy file")?;
        Self::validate(&config)?;
        Ok(config)
    }

    pub async fn save_config(config: &PolicyConfig, path: &str) -> Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .context("Failed to create policy directory")?;
            }
        }

        let yaml = serde_norway::to_string(config)?;
        tokio::fs::write(path, yaml)
            .await
            .context("Failed to save policy file")?;
        Ok(())
    }

    /// Reject policies whose roles are malformed or reference undeclared
    /// permissions. Assignments naming unknown roles are tolerated and
    /// skipped at resolution time.
    pub fn validate(config: &PolicyConfig) -> std::result::Result<(), AuthorizationError> {
        for (code, role_config) in &config.roles {
            let role = role_config.to_role(code);
            role.validate()
                .map_err(|e| AuthorizationError::InvalidPolicy(e.to_string()))?;

            if let Some(missing) = role
                .permissions
                .iter()
                .find(|p| !config.permissions.contains_key(p.as_str()))
            {
                return Err(AuthorizationError::InvalidPolicy(format!(
                    "role '{}' references undeclared permission '{}'",
                    code, missing
                )));
            }
        }

        for (email, user) in &config.users {
            if email.trim().is_empty() {
                return Err(AuthorizationError::InvalidPolicy(
                    "user with blank email".to_string(),
                ));
            }
            if user.name.trim().is_empty() {
                return Err(AuthorizationError::InvalidPolicy(format!(
                    "user '{}' has a blank name",
                    email
                )));
            }
        }

        Ok(())
    }

    /// Built-in catalog with no users.
    pub fn default_config() -> PolicyConfig {
        PolicyConfig {
            permissions: default_permissions()
                .into_iter()
                .map(|p| (p.code.to_string(), PermissionConfig::from(p)))
                .collect(),
            roles: default_roles()
                .into_iter()
                .map(|r| (r.code.clone(), RoleConfig::from(r)))
                .collect(),
            users: Default::default(),
        }
    }
}
