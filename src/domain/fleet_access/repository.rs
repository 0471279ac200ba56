//! Fleet access repository interface

use async_trait::async_trait;

use super::model::{FleetAccessFilter, FleetAccessRecord};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

#[async_trait]
pub trait FleetAccessRepository: Send + Sync {
    /// Insert a new on-site record; `DomainError::Conflict` if the profile
    /// already has one without a departure.
    async fn open_record(&self, record: FleetAccessRecord) -> DomainResult<()>;
    async fn find_open_for_profile(&self, fleet_profile_id: &str) -> DomainResult<Option<FleetAccessRecord>>;
    /// Persist the dispatch fields only if the record is still open.
    async fn close_record(&self, record: &FleetAccessRecord) -> DomainResult<bool>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<FleetAccessRecord>>;
    async fn list(
        &self,
        filter: FleetAccessFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<FleetAccessRecord>>;
    async fn list_open(&self) -> DomainResult<Vec<FleetAccessRecord>>;
}
