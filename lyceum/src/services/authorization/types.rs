use chrono::{DateTime, Utc};
use lyceum_core::authorization::{CampusId, Permission, PermissionCode, Role};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use uuid::Uuid;

/// Policy document loaded from YAML. Backs the identity store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub permissions: BTreeMap<String, PermissionConfig>,
    #[serde(default)]
    pub roles: BTreeMap<String, RoleConfig>,
    /// Users keyed by email.
    #[serde(default)]
    pub users: BTreeMap<String, UserConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionConfig {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl PermissionConfig {
    pub fn to_permission(&self, code: &str) -> Permission {
        Permission {
            code: PermissionCode::from(code),
            label: self.label.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
        }
    }
}

impl From<Permission> for PermissionConfig {
    fn from(permission: Permission) -> Self {
        Self {
            label: permission.label,
            description: permission.description,
            category: permission.category,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleConfig {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hierarchy_level: u8,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub permissions: BTreeSet<PermissionCode>,
}

impl RoleConfig {
    pub fn to_role(&self, code: &str) -> Role {
        Role {
            code: code.to_string(),
            label: self.label.clone(),
            description: self.description.clone(),
            hierarchy_level: self.hierarchy_level,
            active: self.active,
            permissions: self.permissions.clone(),
        }
    }
}

impl From<Role> for RoleConfig {
    fn from(role: Role) -> Self {
        Self {
            label: role.label,
            description: role.description,
            hierarchy_level: role.hierarchy_level,
            active: role.active,
            permissions: role.permissions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserConfig {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl UserConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            active: true,
            assignments: Vec::new(),
        }
    }
}

/// A role held by a user, optionally restricted to one campus.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Assignment {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campus: Option<CampusId>,
    #[serde(default = "Utc::now")]
    pub assigned_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_by: Option<String>,
}

impl Assignment {
    pub fn matches(&self, role: &str, campus: Option<CampusId>) -> bool {
        self.role == role && self.campus == campus
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RoleSummary {
    pub code: String,
    pub label: String,
    pub hierarchy_level: u8,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PermissionMatrixRow {
    pub code: String,
    pub label: String,
    pub category: Option<String>,
    /// Explicit grant per role code. The super-admin override is not folded in.
    pub roles: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PermissionMatrix {
    pub roles: Vec<RoleSummary>,
    pub permissions: Vec<PermissionMatrixRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("User '{user}' holds no matching assignment of role '{role}'")]
    AssignmentNotFound {
        user: String,
        role: String,
        campus: Option<CampusId>,
    },

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Failed to persist policy: {0}")]
    Persistence(String),
}
