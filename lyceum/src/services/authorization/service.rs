use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use lyceum_core::authorization::{
    effective_permissions, evaluate, AccessDecision, CampusId, EffectivePermissions,
    IdentityStore, Permission, PermissionCode, Role, RoleAssignment,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::config::ConfigManager;
use super::fallback::FallbackService;
use super::types::{
    Assignment, AuthorizationError, PermissionMatrix, PermissionMatrixRow, PolicyConfig,
    RoleSummary, UserConfig,
};

/// Policy-file backed authorization service
#[derive(Debug)]
pub struct AuthorizationService {
    config: Arc<RwLock<PolicyConfig>>,
    /// `None` keeps every change in memory only.
    config_path: Option<String>,
}

impl AuthorizationService {
    /// Load the policy file at `policy_path`.
    pub async fn new(policy_path: &str) -> Result<Self> {
        let config = ConfigManager::load_config(policy_path).await?;

        info!(
            "Authorization service initialized with {} permissions, {} roles, {} users",
            config.permissions.len(),
            config.roles.len(),
            config.users.len()
        );

        Ok(Self::new_from_config(config, Some(policy_path.to_string())))
    }

    /// Create a fallback authorization service with the built-in catalog
    pub async fn create_fallback_service(bootstrap_admin: Option<String>) -> Self {
        FallbackService::create_fallback_service(bootstrap_admin).await
    }

    pub fn new_from_config(config: PolicyConfig, config_path: Option<String>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        }
    }

    pub fn config_path(&self) -> Option<&str> {
        self.config_path.as_deref()
    }

    /// Re-read the policy file. The current policy stays in place if the
    /// file cannot be loaded.
    pub async fn reload(&self) -> Result<()> {
        let Some(path) = &self.config_path else {
            anyhow::bail!("Authorization service has no policy file to reload");
        };

        let mut config = self.config.write().await;
        *config = ConfigManager::load_config(path).await?;

        info!(
            "Reloaded policy from {}: {} permissions, {} roles, {} users",
            path,
            config.permissions.len(),
            config.roles.len(),
            config.users.len()
        );
        Ok(())
    }

    /// Persist the current policy, if this service is file-backed
    async fn save_config(&self, snapshot: &PolicyConfig) -> Result<(), AuthorizationError> {
        match &self.config_path {
            Some(path) => ConfigManager::save_config(snapshot, path)
                .await
                .map_err(|e| AuthorizationError::Persistence(format!("{:#}", e))),
            None => {
                debug!("No policy file configured, keeping changes in memory");
                Ok(())
            }
        }
    }

    /// Turn a user's stored assignments into evaluable role assignments.
    fn resolve_in(config: &PolicyConfig, user: &str) -> Option<Vec<RoleAssignment>> {
        let user_config = config.users.get(user)?;
        if !user_config.active {
            debug!("User '{}' is inactive, resolving no assignments", user);
            return Some(Vec::new());
        }

        let assignments = user_config
            .assignments
            .iter()
            .filter_map(|assignment| match config.roles.get(&assignment.role) {
                Some(role_config) => Some(RoleAssignment {
                    role: role_config.to_role(&assignment.role),
                    campus: assignment.campus,
                }),
                None => {
                    warn!(
                        "User '{}' is assigned unknown role '{}', ignoring",
                        user, assignment.role
                    );
                    None
                }
            })
            .collect();

        Some(assignments)
    }

    /// Check a permission for a user, returning the deciding rule
    pub async fn check_permission(
        &self,
        user: &str,
        permission: &str,
        campus: Option<CampusId>,
    ) -> AccessDecision {
        let config = self.config.read().await;
        let decision = match Self::resolve_in(&config, user) {
            Some(assignments) => evaluate(&assignments, permission, campus),
            None => AccessDecision::Denied,
        };

        debug!(
            user,
            permission,
            campus = ?campus,
            allowed = decision.is_allowed(),
            "Permission check: {}",
            decision.reason()
        );

        decision
    }

    pub async fn get_user(&self, user: &str) -> Option<UserConfig> {
        let config = self.config.read().await;
        config.users.get(user).cloned()
    }

    pub async fn get_user_assignments(
        &self,
        user: &str,
    ) -> Result<Vec<Assignment>, AuthorizationError> {
        let config = self.config.read().await;
        config
            .users
            .get(user)
            .map(|u| u.assignments.clone())
            .ok_or_else(|| AuthorizationError::UserNotFound(user.to_string()))
    }

    /// Expand a user's assignments into the permission codes they grant
    pub async fn get_user_permissions(
        &self,
        user: &str,
    ) -> Result<EffectivePermissions, AuthorizationError> {
        let config = self.config.read().await;
        let assignments = Self::resolve_in(&config, user)
            .ok_or_else(|| AuthorizationError::UserNotFound(user.to_string()))?;

        let catalog: Vec<PermissionCode> = config
            .permissions
            .keys()
            .map(|code| PermissionCode::from(code.as_str()))
            .collect();

        Ok(effective_permissions(&assignments, &catalog))
    }

    /// All declared permissions, optionally limited to one category
    pub async fn list_permissions(&self, category: Option<&str>) -> Vec<Permission> {
        let config = self.config.read().await;
        config
            .permissions
            .iter()
            .map(|(code, p)| p.to_permission(code))
            .filter(|p| category.is_none_or(|c| p.category() == Some(c)))
            .collect()
    }

    /// Roles ordered by descending hierarchy level
    pub async fn list_roles(&self, active: Option<bool>) -> Vec<Role> {
        let config = self.config.read().await;
        let mut roles: Vec<Role> = config
            .roles
            .iter()
            .map(|(code, r)| r.to_role(code))
            .filter(|r| active.is_none_or(|a| r.active == a))
            .collect();
        roles.sort_by(|a, b| {
            b.hierarchy_level
                .cmp(&a.hierarchy_level)
                .then_with(|| a.code.cmp(&b.code))
        });
        roles
    }

    pub async fn get_role(&self, code: &str) -> Option<Role> {
        let config = self.config.read().await;
        config.roles.get(code).map(|r| r.to_role(code))
    }

    pub async fn permission_count(&self) -> usize {
        self.config.read().await.permissions.len()
    }

    pub async fn role_count(&self) -> usize {
        self.config.read().await.roles.len()
    }

    /// Which role lists which permission, for the admin matrix view
    pub async fn permission_matrix(&self) -> PermissionMatrix {
        let roles = self.list_roles(None).await;
        let mut permissions = self.list_permissions(None).await;
        permissions.sort_by(|a, b| {
            a.category()
                .cmp(&b.category())
                .then_with(|| a.code.cmp(&b.code))
        });

        let rows = permissions
            .iter()
            .map(|permission| PermissionMatrixRow {
                code: permission.code.to_string(),
                label: permission.label.clone(),
                category: permission.category().map(str::to_string),
                roles: roles
                    .iter()
                    .map(|r| (r.code.clone(), r.grants(permission.code.as_str())))
                    .collect(),
            })
            .collect();

        PermissionMatrix {
            roles: roles
                .into_iter()
                .map(|r| RoleSummary {
                    code: r.code,
                    label: r.label,
                    hierarchy_level: r.hierarchy_level,
                    active: r.active,
                })
                .collect(),
            permissions: rows,
        }
    }

    /// Assign a role to a user, globally or for one campus. Assigning an
    /// existing (role, campus) pair again is a no-op.
    pub async fn assign_user_role(
        &self,
        user: &str,
        role: &str,
        campus: Option<CampusId>,
        assigned_by: Option<&str>,
    ) -> Result<Vec<Assignment>, AuthorizationError> {
        let mut config = self.config.write().await;

        if !config.roles.contains_key(role) {
            return Err(AuthorizationError::RoleNotFound(role.to_string()));
        }

        let mut updated = config.clone();
        let user_config = updated
            .users
            .get_mut(user)
            .ok_or_else(|| AuthorizationError::UserNotFound(user.to_string()))?;

        if user_config
            .assignments
            .iter()
            .any(|a| a.matches(role, campus))
        {
            debug!("User '{}' already holds role '{}'", user, role);
            return Ok(user_config.assignments.clone());
        }

        user_config.assignments.push(Assignment {
            role: role.to_string(),
            campus,
            assigned_at: Utc::now(),
            assigned_by: assigned_by.map(str::to_string),
        });
        let assignments = user_config.assignments.clone();

        self.commit(&mut config, updated).await?;

        match campus {
            Some(campus) => info!(
                "Assigned role '{}' to user '{}' on campus {}",
                role, user, campus
            ),
            None => info!("Assigned role '{}' to user '{}' globally", role, user),
        }
        Ok(assignments)
    }

    /// Remove the assignment matching exactly (role, campus)
    pub async fn revoke_user_role(
        &self,
        user: &str,
        role: &str,
        campus: Option<CampusId>,
    ) -> Result<Vec<Assignment>, AuthorizationError> {
        let mut config = self.config.write().await;

        let mut updated = config.clone();
        let user_config = updated
            .users
            .get_mut(user)
            .ok_or_else(|| AuthorizationError::UserNotFound(user.to_string()))?;

        let before = user_config.assignments.len();
        user_config
            .assignments
            .retain(|a| !a.matches(role, campus));
        if user_config.assignments.len() == before {
            return Err(AuthorizationError::AssignmentNotFound {
                user: user.to_string(),
                role: role.to_string(),
                campus,
            });
        }
        let assignments = user_config.assignments.clone();

        self.commit(&mut config, updated).await?;

        info!("Revoked role '{}' from user '{}'", role, user);
        Ok(assignments)
    }

    /// Persist `updated` and only then make it the live policy. The caller
    /// keeps holding the write lock, so saves happen in the same order as the
    /// changes they contain.
    async fn commit(
        &self,
        live: &mut PolicyConfig,
        updated: PolicyConfig,
    ) -> Result<(), AuthorizationError> {
        self.save_config(&updated).await?;
        *live = updated;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for AuthorizationService {
    async fn resolve_assignments(&self, principal: &str) -> Result<Option<Vec<RoleAssignment>>> {
        let config = self.config.read().await;
        Ok(Self::resolve_in(&config, principal))
    }
}
