//! Identity module: operator login & credentials
//!
//! Contains the `IdentityService` which handles console login, the
//! current-operator profile and password changes.

pub mod service;

pub use service::{AuthResult, IdentityService};
