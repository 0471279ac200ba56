//! Attendance and fleet access history, plus the on-site summary

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::settings::SettingsService;
use crate::domain::{
    AttendanceSession, DomainResult, FleetAccessFilter, FleetAccessRecord, RepositoryProvider,
    SessionFilter,
};
use crate::shared::{PageRequest, PaginatedResult, SharedClock};

/// Open attendance session with its worker's name
#[derive(Debug, Clone)]
pub struct OpenSessionView {
    pub session: AttendanceSession,
    pub worker_name: String,
    pub hours_elapsed: f64,
    pub over_limit: bool,
}

#[derive(Debug, Clone)]
pub struct OpenFleetView {
    pub record: FleetAccessRecord,
    pub full_name: String,
    pub fleet_name: String,
    pub hours_elapsed: f64,
}

#[derive(Debug, Clone)]
pub struct OnSiteSummary {
    pub generated_at: DateTime<Utc>,
    pub max_labor_hours: f64,
    pub workers: Vec<OpenSessionView>,
    pub fleets: Vec<OpenFleetView>,
}

impl OnSiteSummary {
    pub fn over_limit_count(&self) -> usize {
        self.workers.iter().filter(|w| w.over_limit).count()
    }
}

pub struct HistoryService {
    repos: Arc<dyn RepositoryProvider>,
    settings: SettingsService,
    clock: SharedClock,
}

impl HistoryService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, settings: SettingsService, clock: SharedClock) -> Self {
        Self {
            repos,
            settings,
            clock,
        }
    }

    pub async fn sessions(
        &self,
        filter: SessionFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<AttendanceSession>> {
        self.repos.attendance().list(filter, page).await
    }

    pub async fn fleet_access(
        &self,
        filter: FleetAccessFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<FleetAccessRecord>> {
        self.repos.fleet_access().list(filter, page).await
    }

    pub async fn on_site(&self) -> DomainResult<OnSiteSummary> {
        let now = self.clock.now();
        let max_labor_hours = self.settings.current().await?.max_labor_hours;

        let mut workers = Vec::new();
        for session in self.repos.attendance().list_open().await? {
            let worker_name = self
                .repos
                .workers()
                .find_by_id(&session.worker_id)
                .await?
                .map(|w| w.full_name)
                .unwrap_or_default();
            let hours_elapsed = session.running_hours(now);
            workers.push(OpenSessionView {
                over_limit: hours_elapsed > max_labor_hours,
                hours_elapsed,
                worker_name,
                session,
            });
        }

        let mut fleets = Vec::new();
        for record in self.repos.fleet_access().list_open().await? {
            let profile = self
                .repos
                .fleet_profiles()
                .find_by_id(&record.fleet_profile_id)
                .await?;
            let (full_name, fleet_name) = profile
                .map(|p| (p.full_name, p.fleet_name))
                .unwrap_or_default();
            fleets.push(OpenFleetView {
                hours_elapsed: crate::domain::attendance::elapsed_hours(record.arrival_at, now),
                record,
                full_name,
                fleet_name,
            });
        }

        Ok(OnSiteSummary {
            generated_at: now,
            max_labor_hours,
            workers,
            fleets,
        })
    }
}
