//! Attendance aggregate
//!
//! A worker's work session ("jornada") between an authorized entry and
//! an authorized exit.

pub mod hours;
pub mod model;
pub mod repository;

pub use hours::elapsed_hours;
pub use model::{AttendanceSession, SessionFilter, SessionStatus};
pub use repository::AttendanceRepository;
