//! Fleet profile aggregate

pub mod model;
pub mod repository;

pub use model::{FleetProfile, FleetProfileFilter, FleetProfileUpdate};
pub use repository::FleetProfileRepository;
