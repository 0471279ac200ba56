//! Fleet access aggregate
//!
//! One arrival/dispatch cycle of a fleet profile at the site.

pub mod model;
pub mod repository;

pub use model::{FleetAccessFilter, FleetAccessRecord, FleetAccessStatus};
pub use repository::FleetAccessRepository;
