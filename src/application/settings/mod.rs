//! System settings use-cases

pub mod service;

pub use service::SettingsService;
