pub mod checkpoint;
pub mod events;
pub mod identity;
pub mod services;
pub mod settings;

// Re-export key types for convenience
pub use checkpoint::{CheckpointError, CheckpointService, RegistrationRequest};
pub use events::{create_event_bus, Event, EventBus, EventSubscriber, SharedEventBus};
pub use identity::IdentityService;
pub use services::{BadgeIssuer, FleetDirectory, HistoryService, LaborMonitor, WorkerDirectory};
pub use settings::SettingsService;
