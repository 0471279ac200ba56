//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod attendance_repository;
pub mod fleet_access_repository;
pub mod fleet_profile_repository;
pub mod repository_provider;
pub mod settings_repository;
pub mod worker_repository;

pub use repository_provider::SeaOrmRepositoryProvider;

use sea_orm::{DbErr, SqlErr};

use crate::domain::DomainError;

pub(crate) fn db_err(e: DbErr) -> DomainError {
    DomainError::Database(e.to_string())
}

/// Map a unique-index violation to `Conflict`, anything else to `Database`.
pub(crate) fn conflict_or_db_err(e: DbErr, what: impl Into<String>) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::Conflict(what.into()),
        _ => db_err(e),
    }
}
