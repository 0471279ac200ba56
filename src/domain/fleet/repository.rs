//! Fleet profile repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{FleetProfile, FleetProfileFilter};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

#[async_trait]
pub trait FleetProfileRepository: Send + Sync {
    async fn create(&self, profile: FleetProfile) -> DomainResult<()>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<FleetProfile>>;
    /// Exact match on the document id.
    async fn find_by_document(&self, document_id: &str) -> DomainResult<Option<FleetProfile>>;
    async fn update(&self, profile: FleetProfile) -> DomainResult<()>;
    async fn stamp_arrival(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()>;
    async fn list(
        &self,
        filter: FleetProfileFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<FleetProfile>>;
}
