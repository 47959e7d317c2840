//! Authorization service for lyceum
//!
//! Holds the policy (permissions, roles and per-user campus-scoped
//! assignments) loaded from YAML and answers checks with the predicate
//! from `lyceum_core::authorization`.

pub mod config;
pub mod fallback;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::AuthorizationService;
pub use types::{
    Assignment, AuthorizationError, PermissionMatrix, PolicyConfig, RoleConfig, UserConfig,
};
