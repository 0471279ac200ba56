//! Application services

mod badges;
mod fleet_directory;
mod history;
mod labor_monitor;
mod worker_directory;

pub use badges::{BadgeIssuer, IssuedBadge};
pub use fleet_directory::{FleetDirectory, NewFleetProfile};
pub use history::{HistoryService, OnSiteSummary, OpenFleetView, OpenSessionView};
pub use labor_monitor::LaborMonitor;
pub use worker_directory::{NewWorker, WorkerDirectory};
