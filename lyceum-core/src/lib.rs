pub mod api;
pub mod authorization;
pub mod settings;

// Most callers only need the predicate and the assignment model
pub use authorization::check::is_authorized;
pub use authorization::model::{CampusId, PermissionCode, Role, RoleAssignment};
