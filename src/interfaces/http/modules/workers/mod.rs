//! Worker management: admin CRUD, PIN and console password

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
