//! Inbound adapters: REST API and WebSocket notifications

pub mod http;
pub mod ws;

pub use http::{create_api_router, ApiContext};
