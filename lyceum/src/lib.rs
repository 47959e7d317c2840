//! lyceum server library
//!
//! Exposes the router, state and services so integration tests can drive
//! the API without binding a socket.

pub mod api;
pub mod app_state;
pub mod http;
pub mod init_telemetry;
pub mod services;
pub mod settings;
pub mod stop_flag;

pub use app_state::AppState;
