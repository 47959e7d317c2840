pub mod assignments;
pub mod audit_logs;
pub mod permissions;
pub mod policy;
pub mod roles;
