//! # Gatekeeper
//!
//! Geofenced access control for workers and fleet profiles: QR badges,
//! dual-PIN check-in/check-out and attendance records.
//!
//! ## Architecture
//!
//! - **domain**: entities, repository ports, geofence and badge rules
//! - **application**: checkpoint protocol, directories, history, settings, events
//! - **infrastructure**: SeaORM persistence, in-memory store, crypto
//! - **interfaces**: REST API (axum + Swagger) and WebSocket notifications
//! - **shared**: clock, shutdown, errors, pagination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{
    init_database, run_migrations, DatabaseConfig, InMemoryRepositoryProvider,
    SeaOrmRepositoryProvider,
};

pub use interfaces::{create_api_router, ApiContext};

pub use application::{create_event_bus, Event, EventBus, SharedEventBus};
