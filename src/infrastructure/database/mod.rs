pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::SeaOrmRepositoryProvider;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::DatabaseSection;
use migrator::Migrator;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./gatekeeper.db?mode=rwc")
    pub url: String,
    pub sql_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./gatekeeper.db?mode=rwc".to_string(),
            sql_logging: false,
        }
    }
}

impl DatabaseConfig {
    /// Create config for SQLite
    pub fn sqlite(path: &str) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path),
            ..Default::default()
        }
    }

    /// Throwaway database, one connection so every query sees the same memory
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            ..Default::default()
        }
    }
}

impl From<&DatabaseSection> for DatabaseConfig {
    fn from(section: &DatabaseSection) -> Self {
        Self {
            url: section.connection_url(),
            ..Default::default()
        }
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    info!("Connecting to database: {}", config.url);
    let mut opts = ConnectOptions::new(config.url.clone());
    opts.sqlx_logging(config.sql_logging);
    if config.url.starts_with("sqlite::memory:") {
        opts.max_connections(1);
    }
    let db = Database::connect(opts).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// Apply pending migrations
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    info!("Running database migrations...");
    Migrator::up(db, None).await?;
    info!("Migrations complete");
    Ok(())
}
