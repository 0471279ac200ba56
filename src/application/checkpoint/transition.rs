//! Out → In → Out state transitions
//!
//! Every write is guarded at the storage level: entries rely on the
//! repository refusing a second open record, exits on a conditional close
//! that only succeeds while the record is still open.
//!
//! The record write and the presence flag on the worker are two separate
//! writes. When the second one fails, the next attempt for that worker
//! brings the flag back in line with the open session before rejecting.
//! A fleet's `last_arrival_at` is informational and is not reconciled.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::error::CheckpointError;
use super::request::CargoDeclaration;
use crate::domain::{AttendanceSession, FleetAccessRecord, FleetProfile, RepositoryProvider, Worker};

/// Dispatch step of a fleet exit
#[derive(Debug, Clone, PartialEq)]
pub enum FleetExitStage {
    /// Cargo data not provided yet; the client must collect it
    AwaitingCargoInput,
    Ready {
        cargo_quantity: i32,
        observation: Option<String>,
    },
}

impl FleetExitStage {
    pub fn from_declaration(cargo: Option<&CargoDeclaration>) -> Result<Self, CheckpointError> {
        let Some(cargo) = cargo else {
            return Ok(Self::AwaitingCargoInput);
        };
        match cargo.cargo_quantity {
            None => Ok(Self::AwaitingCargoInput),
            Some(q) if q < 0 => Err(CheckpointError::InvalidCargo),
            Some(q) => Ok(Self::Ready {
                cargo_quantity: q,
                observation: cargo.observation.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FleetExit {
    /// Open record found, nothing written
    CargoRequired(FleetAccessRecord),
    Dispatched(FleetAccessRecord),
}

pub struct StateTransition<'a> {
    repos: &'a dyn RepositoryProvider,
}

impl<'a> StateTransition<'a> {
    pub fn new(repos: &'a dyn RepositoryProvider) -> Self {
        Self { repos }
    }

    pub async fn worker_entry(
        &self,
        worker: &Worker,
        at: DateTime<Utc>,
        signature: &str,
    ) -> Result<AttendanceSession, CheckpointError> {
        if let Some(open) = self.repos.attendance().find_open_for_worker(&worker.id).await? {
            if !worker.on_site {
                self.repos
                    .workers()
                    .set_presence(&worker.id, true, open.entry_at)
                    .await?;
            }
            return Err(CheckpointError::DuplicateEntry);
        }

        let session = AttendanceSession::open(&worker.id, at, signature);
        self.repos.attendance().open_session(session.clone()).await?;
        self.repos.workers().set_presence(&worker.id, true, at).await?;

        debug!(worker_id = %worker.id, session_id = %session.id, "Attendance session opened");
        Ok(session)
    }

    pub async fn worker_exit(
        &self,
        worker: &Worker,
        at: DateTime<Utc>,
        signature: &str,
    ) -> Result<AttendanceSession, CheckpointError> {
        let Some(mut session) = self.repos.attendance().find_open_for_worker(&worker.id).await?
        else {
            if worker.on_site {
                self.repos.workers().set_presence(&worker.id, false, at).await?;
            }
            return Err(CheckpointError::NoActiveEntry);
        };

        session.close(at, signature);
        if !self.repos.attendance().close_session(&session).await? {
            return Err(CheckpointError::NoActiveEntry);
        }
        self.repos.workers().set_presence(&worker.id, false, at).await?;

        debug!(
            worker_id = %worker.id,
            session_id = %session.id,
            hours = ?session.hours_worked,
            "Attendance session closed"
        );
        Ok(session)
    }

    pub async fn fleet_arrival(
        &self,
        profile: &FleetProfile,
        at: DateTime<Utc>,
        signature: &str,
    ) -> Result<FleetAccessRecord, CheckpointError> {
        if self
            .repos
            .fleet_access()
            .find_open_for_profile(&profile.id)
            .await?
            .is_some()
        {
            return Err(CheckpointError::DuplicateEntry);
        }

        let record = FleetAccessRecord::arrive(&profile.id, at, signature);
        self.repos.fleet_access().open_record(record.clone()).await?;
        self.repos.fleet_profiles().stamp_arrival(&profile.id, at).await?;

        debug!(fleet_profile_id = %profile.id, record_id = %record.id, "Fleet access opened");
        Ok(record)
    }

    /// The open record is looked up before the cargo stage is considered,
    /// so a fleet that never arrived gets `NoActiveEntry` straight away.
    pub async fn fleet_exit(
        &self,
        profile: &FleetProfile,
        stage: FleetExitStage,
        at: DateTime<Utc>,
        signature: &str,
    ) -> Result<FleetExit, CheckpointError> {
        let mut record = self
            .repos
            .fleet_access()
            .find_open_for_profile(&profile.id)
            .await?
            .ok_or(CheckpointError::NoActiveEntry)?;

        let (cargo_quantity, observation) = match stage {
            FleetExitStage::AwaitingCargoInput => return Ok(FleetExit::CargoRequired(record)),
            FleetExitStage::Ready {
                cargo_quantity,
                observation,
            } => (cargo_quantity, observation),
        };

        record.dispatch(at, cargo_quantity, observation, signature);
        if !self.repos.fleet_access().close_record(&record).await? {
            return Err(CheckpointError::NoActiveEntry);
        }

        debug!(
            fleet_profile_id = %profile.id,
            record_id = %record.id,
            cargo = cargo_quantity,
            "Fleet dispatched"
        );
        Ok(FleetExit::Dispatched(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkerRole;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, h, 0, 0).unwrap()
    }

    #[test]
    fn cargo_stage_from_declaration() {
        assert_eq!(FleetExitStage::from_declaration(None), Ok(FleetExitStage::AwaitingCargoInput));
        let empty = CargoDeclaration {
            cargo_quantity: None,
            observation: Some("x".into()),
        };
        assert_eq!(
            FleetExitStage::from_declaration(Some(&empty)),
            Ok(FleetExitStage::AwaitingCargoInput)
        );
        let negative = CargoDeclaration {
            cargo_quantity: Some(-1),
            observation: None,
        };
        assert_eq!(
            FleetExitStage::from_declaration(Some(&negative)),
            Err(CheckpointError::InvalidCargo)
        );
    }

    #[tokio::test]
    async fn worker_cycle() {
        let repos = InMemoryRepositoryProvider::new();
        let w = Worker::new("Ana", Some("D1".into()), "a@x.io", "h", WorkerRole::Worker);
        repos.workers().create(w.clone()).await.unwrap();
        let t = StateTransition::new(&repos);

        assert_eq!(t.worker_exit(&w, at(8), "s").await.unwrap_err(), CheckpointError::NoActiveEntry);

        t.worker_entry(&w, at(9), "s").await.unwrap();
        assert_eq!(t.worker_entry(&w, at(10), "s").await.unwrap_err(), CheckpointError::DuplicateEntry);

        let closed = t.worker_exit(&w, at(17), "s").await.unwrap();
        assert_eq!(closed.hours_worked, Some(8.0));

        let stored = repos.workers().find_by_id(&w.id).await.unwrap().unwrap();
        assert!(!stored.on_site);
        assert_eq!(stored.last_exit_at, Some(at(17)));
    }

    #[tokio::test]
    async fn presence_flag_is_reconciled_with_open_session() {
        let repos = InMemoryRepositoryProvider::new();
        let w = Worker::new("Ana", Some("D1".into()), "a@x.io", "h", WorkerRole::Worker);
        repos.workers().create(w.clone()).await.unwrap();
        // session written but the presence flag never was
        repos
            .attendance()
            .open_session(AttendanceSession::open(&w.id, at(9), "s"))
            .await
            .unwrap();
        let t = StateTransition::new(&repos);

        assert_eq!(t.worker_entry(&w, at(10), "s").await.unwrap_err(), CheckpointError::DuplicateEntry);
        let stored = repos.workers().find_by_id(&w.id).await.unwrap().unwrap();
        assert!(stored.on_site);
        assert_eq!(stored.last_entry_at, Some(at(9)));

        t.worker_exit(&stored, at(17), "s").await.unwrap();
        // flag left set after the session was closed
        repos.workers().set_presence(&w.id, true, at(9)).await.unwrap();
        let stale = repos.workers().find_by_id(&w.id).await.unwrap().unwrap();
        assert_eq!(t.worker_exit(&stale, at(18), "s").await.unwrap_err(), CheckpointError::NoActiveEntry);
        assert!(!repos.workers().find_by_id(&w.id).await.unwrap().unwrap().on_site);
    }

    #[tokio::test]
    async fn fleet_exit_asks_for_cargo_first() {
        let repos = InMemoryRepositoryProvider::new();
        let f = FleetProfile::new("Luis", "TR-1", "h", "Sur");
        repos.fleet_profiles().create(f.clone()).await.unwrap();
        let t = StateTransition::new(&repos);

        assert_eq!(
            t.fleet_exit(&f, FleetExitStage::AwaitingCargoInput, at(7), "s")
                .await
                .unwrap_err(),
            CheckpointError::NoActiveEntry
        );

        t.fleet_arrival(&f, at(6), "s").await.unwrap();
        let first = t
            .fleet_exit(&f, FleetExitStage::AwaitingCargoInput, at(7), "s")
            .await
            .unwrap();
        assert!(matches!(first, FleetExit::CargoRequired(_)));
        assert!(repos.fleet_access().find_open_for_profile(&f.id).await.unwrap().is_some());

        let ready = FleetExitStage::Ready {
            cargo_quantity: 12,
            observation: None,
        };
        match t.fleet_exit(&f, ready, at(8), "s").await.unwrap() {
            FleetExit::Dispatched(r) => {
                assert_eq!(r.cargo_quantity, Some(12));
                assert_eq!(r.hours_on_site, Some(2.0));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(repos.fleet_access().find_open_for_profile(&f.id).await.unwrap().is_none());
    }
}
