//! In-memory repositories for development and testing

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{
    AttendanceRepository, AttendanceSession, DomainError, DomainResult, FleetAccessFilter,
    FleetAccessRecord, FleetAccessRepository, FleetProfile, FleetProfileFilter,
    FleetProfileRepository, RepositoryProvider, SessionFilter, SettingsRepository, Worker,
    WorkerFilter, WorkerRepository,
};
use crate::shared::{PageRequest, PaginatedResult};

/// All repositories backed by DashMaps
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    workers: MemoryWorkers,
    fleet_profiles: MemoryFleetProfiles,
    attendance: MemoryAttendance,
    fleet_access: MemoryFleetAccess,
    settings: MemorySettings,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
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

// ── Workers ─────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryWorkers {
    rows: DashMap<String, Worker>,
}

impl MemoryWorkers {
    fn check_unique(&self, worker: &Worker) -> DomainResult<()> {
        let email = worker.email.to_lowercase();
        let doc = worker.document_id.as_deref().map(str::to_lowercase);
        for other in self.rows.iter() {
            if other.id == worker.id {
                continue;
            }
            if other.email.to_lowercase() == email {
                return Err(DomainError::Conflict(format!("email {} already registered", worker.email)));
            }
            if doc.is_some() && other.document_id.as_deref().map(str::to_lowercase) == doc {
                return Err(DomainError::Conflict("document id already registered".into()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl WorkerRepository for MemoryWorkers {
    async fn create(&self, worker: Worker) -> DomainResult<()> {
        self.check_unique(&worker)?;
        self.rows.insert(worker.id.clone(), worker);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Worker>> {
        Ok(self.rows.get(id).map(|w| w.clone()))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Worker>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .rows
            .iter()
            .find(|w| w.email.to_lowercase() == email)
            .map(|w| w.clone()))
    }

    async fn find_by_document(&self, document_id: &str) -> DomainResult<Option<Worker>> {
        let doc = document_id.trim().to_lowercase();
        Ok(self
            .rows
            .iter()
            .find(|w| w.document_id.as_deref().map(str::to_lowercase).as_deref() == Some(doc.as_str()))
            .map(|w| w.clone()))
    }

    async fn search_identifier(&self, identifier: &str) -> DomainResult<Vec<Worker>> {
        Ok(self
            .rows
            .iter()
            .filter(|w| w.matches_partially(identifier))
            .map(|w| w.clone())
            .collect())
    }

    async fn update(&self, worker: Worker) -> DomainResult<()> {
        if !self.rows.contains_key(&worker.id) {
            return Err(DomainError::not_found("Worker", "id", &worker.id));
        }
        self.check_unique(&worker)?;
        self.rows.insert(worker.id.clone(), worker);
        Ok(())
    }

    async fn set_presence(&self, id: &str, on_site: bool, at: DateTime<Utc>) -> DomainResult<()> {
        let mut worker = self
            .rows
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Worker", "id", id))?;
        if on_site {
            worker.mark_entry(at);
        } else {
            worker.mark_exit(at);
        }
        Ok(())
    }

    async fn list(&self, filter: WorkerFilter, page: PageRequest) -> DomainResult<PaginatedResult<Worker>> {
        let mut all: Vec<Worker> = self
            .rows
            .iter()
            .filter(|w| filter.matches(w))
            .map(|w| w.clone())
            .collect();
        all.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(PaginatedResult::from_vec(all, page))
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.rows.len() as u64)
    }
}

// ── Fleet profiles ──────────────────────────────────────────────

#[derive(Default)]
struct MemoryFleetProfiles {
    rows: DashMap<String, FleetProfile>,
}

impl MemoryFleetProfiles {
    fn check_unique(&self, profile: &FleetProfile) -> DomainResult<()> {
        if self
            .rows
            .iter()
            .any(|p| p.id != profile.id && p.document_id == profile.document_id)
        {
            return Err(DomainError::Conflict(format!(
                "fleet profile with document {} already exists",
                profile.document_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl FleetProfileRepository for MemoryFleetProfiles {
    async fn create(&self, profile: FleetProfile) -> DomainResult<()> {
        self.check_unique(&profile)?;
        self.rows.insert(profile.id.clone(), profile);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<FleetProfile>> {
        Ok(self.rows.get(id).map(|p| p.clone()))
    }

    async fn find_by_document(&self, document_id: &str) -> DomainResult<Option<FleetProfile>> {
        let doc = document_id.trim();
        Ok(self
            .rows
            .iter()
            .find(|p| p.document_id == doc)
            .map(|p| p.clone()))
    }

    async fn update(&self, profile: FleetProfile) -> DomainResult<()> {
        if !self.rows.contains_key(&profile.id) {
            return Err(DomainError::not_found("FleetProfile", "id", &profile.id));
        }
        self.check_unique(&profile)?;
        self.rows.insert(profile.id.clone(), profile);
        Ok(())
    }

    async fn stamp_arrival(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let mut profile = self
            .rows
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("FleetProfile", "id", id))?;
        profile.last_arrival_at = Some(at);
        profile.updated_at = at;
        Ok(())
    }

    async fn list(
        &self,
        filter: FleetProfileFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<FleetProfile>> {
        let mut all: Vec<FleetProfile> = self
            .rows
            .iter()
            .filter(|p| filter.matches(p))
            .map(|p| p.clone())
            .collect();
        all.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(PaginatedResult::from_vec(all, page))
    }
}

// ── Attendance ──────────────────────────────────────────────────

#[derive(Default)]
struct MemoryAttendance {
    rows: DashMap<String, AttendanceSession>,
    /// worker id → open session id; plays the role of the partial unique index
    open: DashMap<String, String>,
}

#[async_trait]
impl AttendanceRepository for MemoryAttendance {
    async fn open_session(&self, session: AttendanceSession) -> DomainResult<()> {
        match self.open.entry(session.worker_id.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "worker {} already has an open session",
                session.worker_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(session.id.clone());
                self.rows.insert(session.id.clone(), session);
                Ok(())
            }
        }
    }

    async fn find_open_for_worker(&self, worker_id: &str) -> DomainResult<Option<AttendanceSession>> {
        let Some(id) = self.open.get(worker_id).map(|id| id.clone()) else {
            return Ok(None);
        };
        Ok(self.rows.get(&id).map(|s| s.clone()))
    }

    async fn close_session(&self, session: &AttendanceSession) -> DomainResult<bool> {
        let Some(mut stored) = self.rows.get_mut(&session.id) else {
            return Ok(false);
        };
        if !stored.is_open() {
            return Ok(false);
        }
        stored.exit_at = session.exit_at;
        stored.hours_worked = session.hours_worked;
        stored.exit_signature = session.exit_signature.clone();
        stored.status = session.status;
        drop(stored);
        self.open.remove_if(&session.worker_id, |_, id| id == &session.id);
        Ok(true)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<AttendanceSession>> {
        Ok(self.rows.get(id).map(|s| s.clone()))
    }

    async fn list(
        &self,
        filter: SessionFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<AttendanceSession>> {
        let mut all: Vec<AttendanceSession> = self
            .rows
            .iter()
            .filter(|s| filter.matches(s))
            .map(|s| s.clone())
            .collect();
        all.sort_by(|a, b| b.entry_at.cmp(&a.entry_at));
        Ok(PaginatedResult::from_vec(all, page))
    }

    async fn list_open(&self) -> DomainResult<Vec<AttendanceSession>> {
        let mut open: Vec<AttendanceSession> = self
            .rows
            .iter()
            .filter(|s| s.is_open())
            .map(|s| s.clone())
            .collect();
        open.sort_by(|a, b| a.entry_at.cmp(&b.entry_at));
        Ok(open)
    }
}

// ── Fleet access ────────────────────────────────────────────────

#[derive(Default)]
struct MemoryFleetAccess {
    rows: DashMap<String, FleetAccessRecord>,
    open: DashMap<String, String>,
}

#[async_trait]
impl FleetAccessRepository for MemoryFleetAccess {
    async fn open_record(&self, record: FleetAccessRecord) -> DomainResult<()> {
        match self.open.entry(record.fleet_profile_id.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "fleet profile {} is already on site",
                record.fleet_profile_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record.id.clone());
                self.rows.insert(record.id.clone(), record);
                Ok(())
            }
        }
    }

    async fn find_open_for_profile(&self, fleet_profile_id: &str) -> DomainResult<Option<FleetAccessRecord>> {
        let Some(id) = self.open.get(fleet_profile_id).map(|id| id.clone()) else {
            return Ok(None);
        };
        Ok(self.rows.get(&id).map(|r| r.clone()))
    }

    async fn close_record(&self, record: &FleetAccessRecord) -> DomainResult<bool> {
        let Some(mut stored) = self.rows.get_mut(&record.id) else {
            return Ok(false);
        };
        if !stored.is_open() {
            return Ok(false);
        }
        stored.departure_at = record.departure_at;
        stored.hours_on_site = record.hours_on_site;
        stored.cargo_quantity = record.cargo_quantity;
        stored.observation = record.observation.clone();
        stored.exit_signature = record.exit_signature.clone();
        stored.status = record.status;
        drop(stored);
        self.open.remove_if(&record.fleet_profile_id, |_, id| id == &record.id);
        Ok(true)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<FleetAccessRecord>> {
        Ok(self.rows.get(id).map(|r| r.clone()))
    }

    async fn list(
        &self,
        filter: FleetAccessFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<FleetAccessRecord>> {
        let mut all: Vec<FleetAccessRecord> = self
            .rows
            .iter()
            .filter(|r| filter.matches(r))
            .map(|r| r.clone())
            .collect();
        all.sort_by(|a, b| b.arrival_at.cmp(&a.arrival_at));
        Ok(PaginatedResult::from_vec(all, page))
    }

    async fn list_open(&self) -> DomainResult<Vec<FleetAccessRecord>> {
        let mut open: Vec<FleetAccessRecord> = self
            .rows
            .iter()
            .filter(|r| r.is_open())
            .map(|r| r.clone())
            .collect();
        open.sort_by(|a, b| a.arrival_at.cmp(&b.arrival_at));
        Ok(open)
    }
}

// ── Settings ────────────────────────────────────────────────────

#[derive(Default)]
struct MemorySettings {
    rows: DashMap<String, String>,
}

#[async_trait]
impl SettingsRepository for MemorySettings {
    async fn get_all(&self) -> DomainResult<HashMap<String, String>> {
        Ok(self
            .rows
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect())
    }

    async fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        self.rows.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkerRole;

    #[tokio::test]
    async fn second_open_session_conflicts() {
        let repos = InMemoryRepositoryProvider::new();
        let now = Utc::now();
        repos
            .attendance()
            .open_session(AttendanceSession::open("w-1", now, "s"))
            .await
            .unwrap();
        let err = repos
            .attendance()
            .open_session(AttendanceSession::open("w-1", now, "s"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn close_is_conditional() {
        let repos = InMemoryRepositoryProvider::new();
        let now = Utc::now();
        let mut s = AttendanceSession::open("w-1", now, "s");
        repos.attendance().open_session(s.clone()).await.unwrap();

        s.close(now, "x");
        assert!(repos.attendance().close_session(&s).await.unwrap());
        assert!(!repos.attendance().close_session(&s).await.unwrap());
        assert!(repos.attendance().find_open_for_worker("w-1").await.unwrap().is_none());

        // a new cycle may start once the previous one is closed
        repos
            .attendance()
            .open_session(AttendanceSession::open("w-1", now, "s"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let repos = InMemoryRepositoryProvider::new();
        let a = Worker::new("A", Some("1".into()), "same@x.io", "h", WorkerRole::Worker);
        let b = Worker::new("B", Some("2".into()), "SAME@x.io", "h", WorkerRole::Worker);
        repos.workers().create(a).await.unwrap();
        assert!(matches!(
            repos.workers().create(b).await.unwrap_err(),
            DomainError::Conflict(_)
        ));
    }
}
