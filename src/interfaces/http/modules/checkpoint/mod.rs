//! Checkpoint API: registration attempts and geofence probe

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
