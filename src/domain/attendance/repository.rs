//! Attendance repository interface

use async_trait::async_trait;

use super::model::{AttendanceSession, SessionFilter};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Insert a new open session.
    ///
    /// Fails with `DomainError::Conflict` when the worker already has an
    /// open session; implementations must make this check atomic with the
    /// insert.
    async fn open_session(&self, session: AttendanceSession) -> DomainResult<()>;
    /// Most recent session of the worker without an exit timestamp.
    async fn find_open_for_worker(&self, worker_id: &str) -> DomainResult<Option<AttendanceSession>>;
    /// Persist the exit fields of a session only if it is still open.
    ///
    /// Returns `false` when another writer closed it first.
    async fn close_session(&self, session: &AttendanceSession) -> DomainResult<bool>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<AttendanceSession>>;
    async fn list(
        &self,
        filter: SessionFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<AttendanceSession>>;
    async fn list_open(&self) -> DomainResult<Vec<AttendanceSession>>;
}
