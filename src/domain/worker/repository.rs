//! Worker repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{Worker, WorkerFilter};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

#[async_trait]
pub trait WorkerRepository: Send + Sync {
    async fn create(&self, worker: Worker) -> DomainResult<()>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Worker>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Worker>>;
    async fn find_by_document(&self, document_id: &str) -> DomainResult<Option<Worker>>;
    /// Case-insensitive substring match on document id or email.
    async fn search_identifier(&self, identifier: &str) -> DomainResult<Vec<Worker>>;
    async fn update(&self, worker: Worker) -> DomainResult<()>;
    /// Flip the on-site flag and stamp the matching last entry/exit time.
    async fn set_presence(&self, id: &str, on_site: bool, at: DateTime<Utc>) -> DomainResult<()>;
    async fn list(&self, filter: WorkerFilter, page: PageRequest) -> DomainResult<PaginatedResult<Worker>>;
    async fn count(&self) -> DomainResult<u64>;
}
