pub mod server_info;

pub use server_info::ServerInfo;
