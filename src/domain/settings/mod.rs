//! System settings
//!
//! Flat key-value store edited by admins. Stored keys override the
//! defaults from the `[site]` config section.

pub mod model;
pub mod repository;

pub use model::{SettingKey, SystemSettings, MAX_BADGE_TTL_SECS};
pub use repository::SettingsRepository;
