pub mod audit;
pub mod authorization;

pub use audit::AuditLog;
pub use authorization::AuthorizationService;
