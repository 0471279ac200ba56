//! WebSocket interfaces
//!
//! - `notifications`: access events streamed to operator consoles

pub mod notifications;

pub use notifications::{ws_notifications_handler, EventFilter, NotificationState};
