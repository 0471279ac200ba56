//! Notification events
//!
//! Defines all event types that can be broadcasted to subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    WorkerCheckedIn(WorkerCheckedInEvent),
    WorkerCheckedOut(WorkerCheckedOutEvent),
    FleetArrived(FleetArrivedEvent),
    FleetDispatched(FleetDispatchedEvent),
    LaborLimitExceeded(LaborLimitExceededEvent),
    RegistrationRejected(RegistrationRejectedEvent),
    SettingsUpdated(SettingsUpdatedEvent),
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::WorkerCheckedIn(_) => "worker_checked_in",
            Event::WorkerCheckedOut(_) => "worker_checked_out",
            Event::FleetArrived(_) => "fleet_arrived",
            Event::FleetDispatched(_) => "fleet_dispatched",
            Event::LaborLimitExceeded(_) => "labor_limit_exceeded",
            Event::RegistrationRejected(_) => "registration_rejected",
            Event::SettingsUpdated(_) => "settings_updated",
        }
    }

    /// Worker or fleet profile the event is about
    pub fn subject_id(&self) -> Option<&str> {
        match self {
            Event::WorkerCheckedIn(e) => Some(&e.worker_id),
            Event::WorkerCheckedOut(e) => Some(&e.worker_id),
            Event::FleetArrived(e) => Some(&e.fleet_profile_id),
            Event::FleetDispatched(e) => Some(&e.fleet_profile_id),
            Event::LaborLimitExceeded(e) => Some(&e.worker_id),
            Event::RegistrationRejected(e) => e.subject_id.as_deref(),
            Event::SettingsUpdated(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerCheckedInEvent {
    pub worker_id: String,
    pub full_name: String,
    pub session_id: String,
    pub mode: String,
    pub authorized_by: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerCheckedOutEvent {
    pub worker_id: String,
    pub full_name: String,
    pub session_id: String,
    pub mode: String,
    pub hours_worked: f64,
    pub authorized_by: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetArrivedEvent {
    pub fleet_profile_id: String,
    pub full_name: String,
    pub fleet_name: String,
    pub record_id: String,
    pub mode: String,
    pub authorized_by: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetDispatchedEvent {
    pub fleet_profile_id: String,
    pub full_name: String,
    pub fleet_name: String,
    pub record_id: String,
    pub mode: String,
    pub cargo_quantity: i32,
    pub observation: Option<String>,
    pub hours_on_site: f64,
    pub authorized_by: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborLimitExceededEvent {
    pub worker_id: String,
    pub full_name: String,
    pub session_id: String,
    pub entry_at: DateTime<Utc>,
    pub hours_elapsed: f64,
    pub max_labor_hours: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRejectedEvent {
    pub subject_id: Option<String>,
    pub operator_id: String,
    pub code: String,
    pub message: String,
    pub mode: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsUpdatedEvent {
    pub keys: Vec<String>,
    pub updated_by: String,
    pub timestamp: DateTime<Utc>,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_with_type_tag() {
        let msg = EventMessage::new(Event::SettingsUpdated(SettingsUpdatedEvent {
            keys: vec!["geofence_radius_m".into()],
            updated_by: "admin-1".into(),
            timestamp: Utc::now(),
        }));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "SettingsUpdated");
        assert_eq!(json["data"]["keys"][0], "geofence_radius_m");
        assert!(json["id"].is_string());
        assert_eq!(msg.event.event_type(), "settings_updated");
        assert_eq!(msg.event.subject_id(), None);
    }
}
