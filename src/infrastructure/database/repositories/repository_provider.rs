//! SeaORM-backed RepositoryProvider

use sea_orm::DatabaseConnection;

use super::attendance_repository::SeaOrmAttendanceRepository;
use super::fleet_access_repository::SeaOrmFleetAccessRepository;
use super::fleet_profile_repository::SeaOrmFleetProfileRepository;
use super::settings_repository::SeaOrmSettingsRepository;
use super::worker_repository::SeaOrmWorkerRepository;
use crate::domain::{
    AttendanceRepository, FleetAccessRepository, FleetProfileRepository, RepositoryProvider,
    SettingsRepository, WorkerRepository,
};

/// Holds one repository per aggregate, all sharing the same pool
pub struct SeaOrmRepositoryProvider {
    workers: SeaOrmWorkerRepository,
    fleet_profiles: SeaOrmFleetProfileRepository,
    attendance: SeaOrmAttendanceRepository,
    fleet_access: SeaOrmFleetAccessRepository,
    settings: SeaOrmSettingsRepository,
    db: DatabaseConnection,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            workers: SeaOrmWorkerRepository::new(db.clone()),
            fleet_profiles: SeaOrmFleetProfileRepository::new(db.clone()),
            attendance: SeaOrmAttendanceRepository::new(db.clone()),
            fleet_access: SeaOrmFleetAccessRepository::new(db.clone()),
            settings: SeaOrmSettingsRepository::new(db.clone()),
            db,
        }
    }

    /// Raw connection, used by the health check
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn workers(&self) -> &dyn WorkerRepository {
        &self.workers
    }

    fn fleet_profiles(&self) -> &dyn FleetProfileRepository {
        &self.fleet_profiles
    }

    fn attendance(&self) -> &dyn AttendanceRepository {
        &self.attendance
    }

    fn fleet_access(&self) -> &dyn FleetAccessRepository {
        &self.fleet_access
    }

    fn settings(&self) -> &dyn SettingsRepository {
        &self.settings
    }
}
