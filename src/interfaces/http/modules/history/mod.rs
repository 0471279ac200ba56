//! Attendance and fleet access history, on-site summary

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
