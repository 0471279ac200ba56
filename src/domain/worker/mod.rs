//! Worker aggregate
//!
//! Contains the Worker entity, roles, and repository interface.

pub mod model;
pub mod repository;

pub use model::{Worker, WorkerFilter, WorkerRole, WorkerUpdate};
pub use repository::WorkerRepository;
