use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Hierarchy level that implicitly grants every permission.
pub const SUPER_ADMIN_LEVEL: u8 = 100;

/// Opaque permission code such as `programs.edit`.
///
/// Codes are compared by exact match only. The part before the first dot is
/// treated as the category for display purposes and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct PermissionCode(String);

impl PermissionCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Prefix before the first `.`, if any.
    pub fn category(&self) -> Option<&str> {
        self.0
            .split_once('.')
            .map(|(category, _)| category)
            .filter(|category| !category.is_empty())
    }
}

impl Borrow<str> for PermissionCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PermissionCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for PermissionCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a campus, owned by the campus service and referenced here
/// without any foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct CampusId(Uuid);

impl CampusId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for CampusId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for CampusId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl fmt::Display for CampusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Reference data describing a grantable capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Permission {
    pub code: PermissionCode,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Permission {
    pub fn new(code: impl Into<PermissionCode>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            description: None,
            category: None,
        }
    }

    /// Explicit category, falling back to the code prefix.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().or_else(|| self.code.category())
    }
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Role {
    pub code: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hierarchy_level: u8,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub permissions: BTreeSet<PermissionCode>,
}

impl Role {
    pub fn new(code: impl Into<String>, label: impl Into<String>, hierarchy_level: u8) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            description: None,
            hierarchy_level,
            active: true,
            permissions: BTreeSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_permissions<I, P>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PermissionCode>,
    {
        self.permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn is_super_admin(&self) -> bool {
        self.hierarchy_level == SUPER_ADMIN_LEVEL
    }

    /// Whether the explicit permission set contains `code`.
    ///
    /// This ignores both the `active` flag and the super-admin override; the
    /// decision in [`crate::authorization::check`] applies those.
    pub fn grants(&self, code: &str) -> bool {
        self.permissions.contains(code)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.code.trim().is_empty() {
            return Err(ModelError::BlankRoleCode);
        }
        if self.hierarchy_level > SUPER_ADMIN_LEVEL {
            return Err(ModelError::InvalidHierarchyLevel {
                role: self.code.clone(),
                level: self.hierarchy_level,
            });
        }
        if self.permissions.iter().any(PermissionCode::is_blank) {
            return Err(ModelError::BlankPermissionCode {
                role: self.code.clone(),
            });
        }
        Ok(())
    }
}

/// A role held by a principal, optionally restricted to one campus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct RoleAssignment {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campus: Option<CampusId>,
}

impl RoleAssignment {
    pub fn global(role: Role) -> Self {
        Self { role, campus: None }
    }

    pub fn scoped(role: Role, campus: CampusId) -> Self {
        Self {
            role,
            campus: Some(campus),
        }
    }

    /// Whether this assignment takes part in a check against `target`.
    ///
    /// Unscoped assignments always apply. Scoped ones apply only when the
    /// check names the same campus; a check without a campus never matches a
    /// scoped assignment.
    pub fn applies_to(&self, target: Option<CampusId>) -> bool {
        match (self.campus, target) {
            (None, _) => true,
            (Some(scope), Some(target)) => scope == target,
            (Some(_), None) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Role code cannot be empty")]
    BlankRoleCode,

    #[error("Role '{role}' has hierarchy level {level}, maximum is 100")]
    InvalidHierarchyLevel { role: String, level: u8 },

    #[error("Role '{role}' contains an empty permission code")]
    BlankPermissionCode { role: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campus(n: u128) -> CampusId {
        CampusId::new(Uuid::from_u128(n))
    }

    #[test]
    fn test_permission_code_category() {
        assert_eq!(PermissionCode::from("news.edit").category(), Some("news"));
        assert_eq!(PermissionCode::from("admin.audit").category(), Some("admin"));
        assert_eq!(PermissionCode::from("standalone").category(), None);
        assert_eq!(PermissionCode::from(".odd").category(), None);
    }

    #[test]
    fn test_permission_explicit_category_wins() {
        let mut permission = Permission::new("stats.export", "Export statistics");
        assert_eq!(permission.category(), Some("stats"));
        permission.category = Some("reporting".to_string());
        assert_eq!(permission.category(), Some("reporting"));
    }

    #[test]
    fn test_role_grants_exact_match_only() {
        let role = Role::new("editor", "Editor", 50).with_permissions(["news.edit"]);
        assert!(role.grants("news.edit"));
        assert!(!role.grants("news"));
        assert!(!role.grants("news.edit "));
        assert!(!role.grants("NEWS.EDIT"));
    }

    #[test]
    fn test_role_validation() {
        assert!(Role::new("viewer", "Viewer", 10).validate().is_ok());
        assert!(Role::new("super_admin", "Super admin", 100).validate().is_ok());

        assert_eq!(
            Role::new("boss", "Boss", 101).validate(),
            Err(ModelError::InvalidHierarchyLevel {
                role: "boss".to_string(),
                level: 101
            })
        );
        assert_eq!(
            Role::new("  ", "Blank", 1).validate(),
            Err(ModelError::BlankRoleCode)
        );
        assert!(matches!(
            Role::new("broken", "Broken", 1)
                .with_permissions([""])
                .validate(),
            Err(ModelError::BlankPermissionCode { .. })
        ));
    }

    #[test]
    fn test_assignment_scope_matching() {
        let role = Role::new("campus_manager", "Campus manager", 60);

        let global = RoleAssignment::global(role.clone());
        assert!(global.applies_to(None));
        assert!(global.applies_to(Some(campus(1))));

        let scoped = RoleAssignment::scoped(role, campus(1));
        assert!(scoped.applies_to(Some(campus(1))));
        assert!(!scoped.applies_to(Some(campus(2))));
        assert!(!scoped.applies_to(None));
    }

    #[test]
    fn test_campus_id_parsing() {
        let parsed: CampusId = " 00000000-0000-0000-0000-000000000007 ".parse().unwrap();
        assert_eq!(parsed, campus(7));
        assert!("not-a-uuid".parse::<CampusId>().is_err());
    }

    #[test]
    fn test_role_yaml_defaults() {
        let role: Role = serde_norway::from_str(
            "code: viewer\nlabel: Viewer\npermissions: [news.view, events.view]\n",
        )
        .unwrap();
        assert!(role.active);
        assert_eq!(role.hierarchy_level, 0);
        assert!(role.grants("events.view"));
    }
}
