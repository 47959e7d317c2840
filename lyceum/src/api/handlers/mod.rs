pub mod admin;
pub mod health;
pub mod info;
pub mod me;
