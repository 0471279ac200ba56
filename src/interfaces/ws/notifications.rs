//! WebSocket handler for operator console notifications
//!
//! Browsers cannot set headers on a WebSocket upgrade, so the JWT travels
//! in the `token` query parameter.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::select;
use tracing::{debug, error, info, warn};

use crate::application::events::{EventMessage, SharedEventBus};
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig};

/// Query parameters: auth token plus optional filters
#[derive(Debug, Default, Deserialize)]
pub struct EventFilter {
    pub token: Option<String>,
    /// Worker or fleet profile id
    pub subject_id: Option<String>,
    /// Comma-separated event types
    pub event_types: Option<String>,
}

impl EventFilter {
    pub fn matches(&self, message: &EventMessage) -> bool {
        if let Some(ref wanted) = self.subject_id {
            if message.event.subject_id() != Some(wanted.as_str()) {
                return false;
            }
        }

        if let Some(ref types) = self.event_types {
            let event_type = message.event.event_type();
            if !types.split(',').map(str::trim).any(|t| t == event_type) {
                return false;
            }
        }

        true
    }
}

#[derive(Clone)]
pub struct NotificationState {
    pub event_bus: SharedEventBus,
    pub jwt_config: JwtConfig,
}

pub async fn ws_notifications_handler(
    ws: WebSocketUpgrade,
    State(state): State<NotificationState>,
    Query(filter): Query<EventFilter>,
) -> Response {
    let claims = match filter.token.as_deref().map(|t| verify_token(t, &state.jwt_config)) {
        Some(Ok(claims)) => claims,
        _ => return (StatusCode::UNAUTHORIZED, "Missing or invalid token").into_response(),
    };

    info!(
        worker_id = %claims.sub,
        subject_id = ?filter.subject_id,
        event_types = ?filter.event_types,
        "Notification client connecting"
    );

    ws.on_upgrade(move |socket| handle_notification_socket(socket, state, filter))
}

async fn handle_notification_socket(socket: WebSocket, state: NotificationState, filter: EventFilter) {
    let (mut sender, mut receiver) = socket.split();
    let mut subscriber = state.event_bus.subscribe();

    let welcome = serde_json::json!({
        "type": "connected",
        "message": "Connected to notification stream",
        "filter": {
            "subject_id": filter.subject_id,
            "event_types": filter.event_types
        }
    });
    if let Err(e) = sender.send(Message::Text(welcome.to_string().into())).await {
        error!("Failed to send welcome message: {}", e);
        return;
    }

    loop {
        select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = sender.send(Message::Pong(data)).await {
                            error!("Failed to send pong: {}", e);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }

            event = subscriber.recv() => {
                let Some(event_msg) = event else {
                    warn!("Event bus closed");
                    break;
                };
                if !filter.matches(&event_msg) {
                    continue;
                }
                match serde_json::to_string(&event_msg) {
                    Ok(json) => {
                        if let Err(e) = sender.send(Message::Text(json.into())).await {
                            debug!("Notification client went away: {}", e);
                            break;
                        }
                    }
                    Err(e) => error!("Failed to serialize event: {}", e),
                }
            }
        }
    }

    info!("Notification client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::{Event, FleetArrivedEvent, SettingsUpdatedEvent};
    use chrono::Utc;

    fn arrived(profile: &str) -> EventMessage {
        EventMessage::new(Event::FleetArrived(FleetArrivedEvent {
            fleet_profile_id: profile.to_string(),
            full_name: "Luis Vera".into(),
            fleet_name: "Transportes Sur".into(),
            record_id: "r-1".into(),
            mode: "camera".into(),
            authorized_by: "w-1".into(),
            timestamp: Utc::now(),
        }))
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(EventFilter::default().matches(&arrived("f-1")));
    }

    #[test]
    fn filters_by_subject_and_type() {
        let filter = EventFilter {
            subject_id: Some("f-1".into()),
            event_types: Some("worker_checked_in, fleet_arrived".into()),
            ..Default::default()
        };
        assert!(filter.matches(&arrived("f-1")));
        assert!(!filter.matches(&arrived("f-2")));

        let settings = EventMessage::new(Event::SettingsUpdated(SettingsUpdatedEvent {
            keys: vec!["company_name".into()],
            updated_by: "admin".into(),
            timestamp: Utc::now(),
        }));
        let by_type = EventFilter {
            event_types: Some("settings_updated".into()),
            ..Default::default()
        };
        assert!(by_type.matches(&settings));
        assert!(!filter.matches(&settings));
    }
}
