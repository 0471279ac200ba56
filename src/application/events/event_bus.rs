//! Broadcast bus carrying checkpoint events to notification sockets and
//! background tasks

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::types::{Event, EventMessage};

/// Slow consumers beyond this backlog skip ahead and lose events
const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventMessage>,
    listeners: Arc<AtomicUsize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            listeners: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fire and forget. Returns how many subscribers got the event; zero
    /// is normal when no console is connected.
    pub fn publish(&self, event: Event) -> usize {
        let message = EventMessage::new(event);
        let event_type = message.event.event_type();
        metrics::counter!("gatekeeper_events_published_total", "event_type" => event_type)
            .increment(1);

        let delivered = self.sender.send(message).unwrap_or(0);
        debug!(event_type, delivered, "Event published");
        delivered
    }

    pub fn subscribe(&self) -> EventSubscriber {
        let total = self.listeners.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::gauge!("gatekeeper_event_subscribers").set(total as f64);
        debug!(total, "Event subscriber added");
        EventSubscriber {
            receiver: self.sender.subscribe(),
            listeners: self.listeners.clone(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.load(Ordering::SeqCst)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct EventSubscriber {
    receiver: broadcast::Receiver<EventMessage>,
    listeners: Arc<AtomicUsize>,
}

impl EventSubscriber {
    /// Next event, skipping over anything lost to lag. `None` once the
    /// bus is gone.
    pub async fn recv(&mut self) -> Option<EventMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Event subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for EventSubscriber {
    fn drop(&mut self) {
        let remaining = self.listeners.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        metrics::gauge!("gatekeeper_event_subscribers").set(remaining as f64);
    }
}

pub type SharedEventBus = Arc<EventBus>;

pub fn create_event_bus() -> SharedEventBus {
    Arc::new(EventBus::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::SettingsUpdatedEvent;

    fn settings_event() -> Event {
        Event::SettingsUpdated(SettingsUpdatedEvent {
            keys: vec!["company_name".into()],
            updated_by: "admin".into(),
            timestamp: chrono::Utc::now(),
        })
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.publish(settings_event()), 2);

        assert_eq!(a.recv().await.unwrap().event.event_type(), "settings_updated");
        assert_eq!(b.recv().await.unwrap().event.event_type(), "settings_updated");
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_to_newest() {
        let bus = EventBus::with_capacity(2);
        let mut sub = bus.subscribe();
        for _ in 0..5 {
            bus.publish(settings_event());
        }
        assert!(sub.recv().await.is_some());
    }

    #[tokio::test]
    async fn dropping_subscriber_updates_count() {
        let bus = EventBus::new();
        let sub = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(settings_event()), 0);
    }
}
