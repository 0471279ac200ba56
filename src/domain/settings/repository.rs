//! Settings repository interface

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::DomainResult;

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// All stored rows, keyed by setting name
    async fn get_all(&self) -> DomainResult<HashMap<String, String>>;
    /// Insert or replace one row
    async fn set(&self, key: &str, value: &str) -> DomainResult<()>;
}
