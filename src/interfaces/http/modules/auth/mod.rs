//! Authentication module: console login, profile, password change

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
