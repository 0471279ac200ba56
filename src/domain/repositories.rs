//! Repository access for the domain layer
//!
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::attendance::AttendanceRepository;
use super::fleet::FleetProfileRepository;
use super::fleet_access::FleetAccessRepository;
use super::settings::SettingsRepository;
use super::worker::WorkerRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let worker = repos.workers().find_by_id("w-1").await?;
///     let open = repos.attendance().find_open_for_worker("w-1").await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn workers(&self) -> &dyn WorkerRepository;
    fn fleet_profiles(&self) -> &dyn FleetProfileRepository;
    fn attendance(&self) -> &dyn AttendanceRepository;
    fn fleet_access(&self) -> &dyn FleetAccessRepository;
    fn settings(&self) -> &dyn SettingsRepository;
}
