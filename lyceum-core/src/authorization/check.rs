//! The authorization predicate.
//!
//! Everything here is a pure function of its arguments: no I/O, no locking,
//! no logging. Callers record decisions themselves.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::model::{CampusId, PermissionCode, RoleAssignment};

/// Outcome of a check together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum AccessDecision {
    /// An active level-100 role overrides every other consideration.
    SuperAdmin { role: String },
    /// A qualifying assignment lists the permission explicitly.
    Granted {
        role: String,
        campus: Option<CampusId>,
    },
    Denied,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, AccessDecision::Denied)
    }

    pub fn reason(&self) -> String {
        match self {
            AccessDecision::SuperAdmin { role } => format!("super-admin role '{}'", role),
            AccessDecision::Granted {
                role,
                campus: Some(campus),
            } => format!("role '{}' on campus {}", role, campus),
            AccessDecision::Granted { role, campus: None } => format!("global role '{}'", role),
            AccessDecision::Denied => "no qualifying role grants this permission".to_string(),
        }
    }
}

/// Decide whether the holder of `assignments` may perform an action that
/// requires `permission`, optionally targeting `target_campus`.
pub fn is_authorized(
    assignments: &[RoleAssignment],
    permission: &str,
    target_campus: Option<CampusId>,
) -> bool {
    evaluate(assignments, permission, target_campus).is_allowed()
}

/// Same decision as [`is_authorized`], reporting which rule decided it.
pub fn evaluate(
    assignments: &[RoleAssignment],
    permission: &str,
    target_campus: Option<CampusId>,
) -> AccessDecision {
    // A blank code names no permission. This runs before the super-admin
    // override, so a super-admin is denied it too.
    if permission.trim().is_empty() {
        return AccessDecision::Denied;
    }

    // Super-admin override, independent of campus scope
    if let Some(assignment) = assignments
        .iter()
        .find(|a| a.role.active && a.role.is_super_admin())
    {
        return AccessDecision::SuperAdmin {
            role: assignment.role.code.clone(),
        };
    }

    assignments
        .iter()
        .filter(|a| a.role.active && a.applies_to(target_campus))
        .find(|a| a.role.grants(permission))
        .map(|a| AccessDecision::Granted {
            role: a.role.code.clone(),
            campus: a.campus,
        })
        .unwrap_or(AccessDecision::Denied)
}

/// Highest hierarchy level among active roles, 0 when there are none.
pub fn highest_level(assignments: &[RoleAssignment]) -> u8 {
    assignments
        .iter()
        .filter(|a| a.role.active)
        .map(|a| a.role.hierarchy_level)
        .max()
        .unwrap_or(0)
}

/// Highest hierarchy level among the active roles that take part in a check
/// against `target_campus`, 0 when there are none.
pub fn highest_level_on(assignments: &[RoleAssignment], target_campus: Option<CampusId>) -> u8 {
    assignments
        .iter()
        .filter(|a| a.role.active && a.applies_to(target_campus))
        .map(|a| a.role.hierarchy_level)
        .max()
        .unwrap_or(0)
}

/// What a set of assignments grants, for display and debugging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct EffectivePermissions {
    pub super_admin: bool,
    pub highest_level: u8,
    /// Codes granted regardless of campus.
    pub global: BTreeSet<PermissionCode>,
    /// Codes granted only when targeting the given campus.
    pub campuses: BTreeMap<CampusId, BTreeSet<PermissionCode>>,
}

/// Expand assignments into the codes they grant.
///
/// A super-admin is reported as holding the whole `catalog` globally.
pub fn effective_permissions<'a, I>(assignments: &[RoleAssignment], catalog: I) -> EffectivePermissions
where
    I: IntoIterator<Item = &'a PermissionCode>,
{
    let mut effective = EffectivePermissions {
        highest_level: highest_level(assignments),
        ..Default::default()
    };

    if assignments
        .iter()
        .any(|a| a.role.active && a.role.is_super_admin())
    {
        effective.super_admin = true;
        effective.global = catalog.into_iter().cloned().collect();
        return effective;
    }

    for assignment in assignments.iter().filter(|a| a.role.active) {
        let target = match assignment.campus {
            None => &mut effective.global,
            Some(campus) => effective.campuses.entry(campus).or_default(),
        };
        target.extend(assignment.role.permissions.iter().cloned());
    }

    effective
}
