//! Domain layer: entities, value types and repository ports
//!
//! Nothing in here touches the database or HTTP; infrastructure adapters
//! implement the repository traits.

pub mod attendance;
pub mod badge;
pub mod events;
pub mod fleet;
pub mod fleet_access;
pub mod geofence;
pub mod repositories;
pub mod settings;
pub mod subject;
pub mod worker;

pub use attendance::{AttendanceRepository, AttendanceSession, SessionFilter, SessionStatus};
pub use badge::{BadgeError, BadgePayload};
pub use fleet::{FleetProfile, FleetProfileFilter, FleetProfileRepository, FleetProfileUpdate};
pub use fleet_access::{FleetAccessFilter, FleetAccessRecord, FleetAccessRepository, FleetAccessStatus};
pub use geofence::{GeoPoint, Geofence, GeofenceCheck};
pub use repositories::{DomainResult, RepositoryProvider};
pub use settings::{SettingKey, SettingsRepository, SystemSettings};
pub use subject::{AccessSubject, Subject, SubjectKind};
pub use worker::{Worker, WorkerFilter, WorkerRepository, WorkerRole, WorkerUpdate};

pub use crate::shared::errors::DomainError;
