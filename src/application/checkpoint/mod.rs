//! Checkpoint protocol: one check-in/check-out registration attempt
//!
//! An attempt runs these steps in order and stops at the first rejection:
//!
//! 1. geofence check of the operator's device position
//! 2. resolution of the scanned/typed identifier to a [`Subject`]
//! 3. subject PIN (manual mode only)
//! 4. authorizer PIN and role of the logged-in operator
//! 5. state transition (entry or exit)
//!
//! [`Subject`]: crate::domain::Subject

pub mod authorization;
pub mod error;
pub mod request;
pub mod resolver;
pub mod service;
pub mod transition;

pub use authorization::AuthorizerSignature;
pub use error::{CheckpointError, ErrorCategory, ResetScope};
pub use request::{CargoDeclaration, Direction, InputMode, RegistrationRequest};
pub use resolver::EntityResolver;
pub use service::{CheckpointService, RegistrationOutcome, RegistrationReceipt};
pub use transition::{FleetExitStage, StateTransition};
