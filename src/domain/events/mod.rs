//! Domain events
//!
//! Event types that represent facts about what happened at the checkpoint.
//! The EventBus implementation lives in `application::events`.

pub mod types;

pub use types::{
    Event, EventMessage, FleetArrivedEvent, FleetDispatchedEvent, LaborLimitExceededEvent,
    RegistrationRejectedEvent, SettingsUpdatedEvent, WorkerCheckedInEvent, WorkerCheckedOutEvent,
};
