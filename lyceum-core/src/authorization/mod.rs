//! Campus-scoped role based access control.
//!
//! The decision itself lives in [`check`] and is a pure function of the
//! assignments handed to it. Loading those assignments is the job of an
//! [`store::IdentityStore`] implementation owned by the caller.

pub mod catalog;
pub mod check;
pub mod model;
pub mod store;

pub use check::{
    effective_permissions, evaluate, highest_level, highest_level_on, AccessDecision,
    EffectivePermissions,
};
pub use model::{
    CampusId, ModelError, Permission, PermissionCode, Role, RoleAssignment, SUPER_ADMIN_LEVEL,
};
pub use store::{authorize, IdentityStore};
