//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_workers;
mod m20240101_000002_create_fleet_profiles;
mod m20240101_000003_create_attendance_sessions;
mod m20240101_000004_create_fleet_access_records;
mod m20240101_000005_create_system_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_workers::Migration),
            Box::new(m20240101_000002_create_fleet_profiles::Migration),
            Box::new(m20240101_000003_create_attendance_sessions::Migration),
            Box::new(m20240101_000004_create_fleet_access_records::Migration),
            Box::new(m20240101_000005_create_system_settings::Migration),
        ]
    }
}
