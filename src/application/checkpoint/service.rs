//! Checkpoint service: runs one registration attempt end to end

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::authorization::{authorize_operator, verify_subject_pin, AuthorizerSignature};
use super::error::CheckpointError;
use super::request::{Direction, RegistrationRequest};
use super::resolver::EntityResolver;
use super::transition::{FleetExit, FleetExitStage, StateTransition};
use crate::application::events::{
    Event, FleetArrivedEvent, FleetDispatchedEvent, RegistrationRejectedEvent, SharedEventBus,
    WorkerCheckedInEvent, WorkerCheckedOutEvent,
};
use crate::application::settings::SettingsService;
use crate::domain::{
    AccessSubject, AttendanceSession, FleetAccessRecord, GeoPoint, GeofenceCheck,
    RepositoryProvider, Subject, SubjectKind,
};
use crate::shared::SharedClock;

#[derive(Debug, Clone)]
pub enum RegistrationOutcome {
    WorkerCheckedIn(AttendanceSession),
    WorkerCheckedOut(AttendanceSession),
    FleetArrived(FleetAccessRecord),
    FleetDispatched(FleetAccessRecord),
    /// Fleet exit paused until cargo data is supplied; nothing was written
    CargoInputRequired(FleetAccessRecord),
}

impl RegistrationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkerCheckedIn(_) => "worker_checked_in",
            Self::WorkerCheckedOut(_) => "worker_checked_out",
            Self::FleetArrived(_) => "fleet_arrived",
            Self::FleetDispatched(_) => "fleet_dispatched",
            Self::CargoInputRequired(_) => "cargo_input_required",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationReceipt {
    pub subject_kind: SubjectKind,
    pub subject_id: String,
    pub display_name: String,
    pub geofence: GeofenceCheck,
    pub signature: AuthorizerSignature,
    pub outcome: RegistrationOutcome,
}

pub struct CheckpointService {
    repos: Arc<dyn RepositoryProvider>,
    settings: SettingsService,
    event_bus: SharedEventBus,
    clock: SharedClock,
    /// One async lock per subject; serializes attempts on the same badge
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl CheckpointService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        settings: SettingsService,
        event_bus: SharedEventBus,
        clock: SharedClock,
    ) -> Self {
        Self {
            repos,
            settings,
            event_bus,
            clock,
            locks: DashMap::new(),
        }
    }

    /// Distance to the configured origin, without rejecting when outside.
    pub async fn measure(&self, position: GeoPoint) -> Result<GeofenceCheck, CheckpointError> {
        if !position.is_valid() {
            return Err(CheckpointError::InvalidCoordinates);
        }
        let settings = self.settings.current().await?;
        Ok(settings.geofence().check(&position))
    }

    /// Run a registration attempt on behalf of the logged-in operator.
    pub async fn register(
        &self,
        operator_id: &str,
        request: RegistrationRequest,
    ) -> Result<RegistrationReceipt, CheckpointError> {
        let mut resolved = None;
        let result = self.attempt(operator_id, &request, &mut resolved).await;

        match &result {
            Ok(receipt) => {
                metrics::counter!(
                    "checkpoint_registrations_total",
                    "outcome" => receipt.outcome.as_str(),
                    "mode" => request.mode.as_str()
                )
                .increment(1);
                info!(
                    "✅ {} {} ({}) via {} by {}",
                    receipt.outcome.as_str(),
                    receipt.display_name,
                    receipt.subject_id,
                    request.mode.as_str(),
                    receipt.signature.full_name
                );
            }
            Err(e) => {
                metrics::counter!("checkpoint_rejections_total", "code" => e.code()).increment(1);
                warn!(
                    operator_id,
                    code = e.code(),
                    mode = request.mode.as_str(),
                    direction = request.direction.as_str(),
                    subject_id = ?resolved,
                    "Registration rejected: {}",
                    e
                );
                self.event_bus
                    .publish(Event::RegistrationRejected(RegistrationRejectedEvent {
                        subject_id: resolved,
                        operator_id: operator_id.to_string(),
                        code: e.code().to_string(),
                        message: e.to_string(),
                        mode: request.mode.as_str().to_string(),
                        timestamp: self.clock.now(),
                    }));
            }
        }
        result
    }

    async fn attempt(
        &self,
        operator_id: &str,
        request: &RegistrationRequest,
        resolved: &mut Option<String>,
    ) -> Result<RegistrationReceipt, CheckpointError> {
        let settings = self.settings.current().await?;

        if !request.position.is_valid() {
            return Err(CheckpointError::InvalidCoordinates);
        }
        let geofence = settings.geofence().check(&request.position);
        if !geofence.inside {
            return Err(CheckpointError::GeofenceViolation {
                distance_m: geofence.distance_m,
                radius_m: geofence.radius_m,
            });
        }

        let now = self.clock.now();
        let subject = EntityResolver::new(self.repos.as_ref())
            .resolve(&request.identifier, request.mode, now, settings.qr_token_ttl_secs)
            .await?;
        *resolved = Some(subject.subject_id().to_string());

        verify_subject_pin(&subject, request.mode, request.subject_pin.as_deref())?;
        let (_, signature) = authorize_operator(
            self.repos.as_ref(),
            operator_id,
            &request.authorizer_pin,
            request.mode,
            now,
        )
        .await?;

        let key = format!("{}:{}", subject.kind(), subject.subject_id());
        let lock = self.locks.entry(key.clone()).or_default().clone();
        let outcome = {
            let _guard = lock.lock().await;
            self.transition(&subject, request, &signature).await
        };
        drop(lock);
        // Nobody else holds or waits on it: forget the lock
        self.locks.remove_if(&key, |_, l| Arc::strong_count(l) == 1);
        let outcome = outcome?;

        let receipt = RegistrationReceipt {
            subject_kind: subject.kind(),
            subject_id: subject.subject_id().to_string(),
            display_name: subject.display_name().to_string(),
            geofence,
            signature,
            outcome,
        };
        self.publish(&subject, request, &receipt);
        Ok(receipt)
    }

    /// Runs with the subject lock held.
    async fn transition(
        &self,
        subject: &Subject,
        request: &RegistrationRequest,
        signature: &AuthorizerSignature,
    ) -> Result<RegistrationOutcome, CheckpointError> {
        // Time of the write, after any wait on the subject lock
        let at = self.clock.now();
        let audit = signature.to_string();
        let transition = StateTransition::new(self.repos.as_ref());

        let outcome = match (subject, request.direction) {
            (Subject::Worker(w), Direction::Entry) => {
                RegistrationOutcome::WorkerCheckedIn(transition.worker_entry(w, at, &audit).await?)
            }
            (Subject::Worker(w), Direction::Exit) => {
                RegistrationOutcome::WorkerCheckedOut(transition.worker_exit(w, at, &audit).await?)
            }
            (Subject::Fleet(f), Direction::Entry) => {
                RegistrationOutcome::FleetArrived(transition.fleet_arrival(f, at, &audit).await?)
            }
            (Subject::Fleet(f), Direction::Exit) => {
                let stage = FleetExitStage::from_declaration(request.cargo.as_ref())?;
                match transition.fleet_exit(f, stage, at, &audit).await? {
                    FleetExit::CargoRequired(r) => RegistrationOutcome::CargoInputRequired(r),
                    FleetExit::Dispatched(r) => RegistrationOutcome::FleetDispatched(r),
                }
            }
        };
        Ok(outcome)
    }

    fn publish(&self, subject: &Subject, request: &RegistrationRequest, receipt: &RegistrationReceipt) {
        let mode = request.mode.as_str().to_string();
        let authorized_by = receipt.signature.to_string();

        let event = match (&receipt.outcome, subject) {
            (RegistrationOutcome::WorkerCheckedIn(s), _) => {
                Event::WorkerCheckedIn(WorkerCheckedInEvent {
                    worker_id: s.worker_id.clone(),
                    full_name: receipt.display_name.clone(),
                    session_id: s.id.clone(),
                    mode,
                    authorized_by,
                    timestamp: s.entry_at,
                })
            }
            (RegistrationOutcome::WorkerCheckedOut(s), _) => {
                Event::WorkerCheckedOut(WorkerCheckedOutEvent {
                    worker_id: s.worker_id.clone(),
                    full_name: receipt.display_name.clone(),
                    session_id: s.id.clone(),
                    mode,
                    hours_worked: s.hours_worked.unwrap_or_default(),
                    authorized_by,
                    timestamp: s.exit_at.unwrap_or(s.entry_at),
                })
            }
            (RegistrationOutcome::FleetArrived(r), Subject::Fleet(f)) => {
                Event::FleetArrived(FleetArrivedEvent {
                    fleet_profile_id: r.fleet_profile_id.clone(),
                    full_name: f.full_name.clone(),
                    fleet_name: f.fleet_name.clone(),
                    record_id: r.id.clone(),
                    mode,
                    authorized_by,
                    timestamp: r.arrival_at,
                })
            }
            (RegistrationOutcome::FleetDispatched(r), Subject::Fleet(f)) => {
                Event::FleetDispatched(FleetDispatchedEvent {
                    fleet_profile_id: r.fleet_profile_id.clone(),
                    full_name: f.full_name.clone(),
                    fleet_name: f.fleet_name.clone(),
                    record_id: r.id.clone(),
                    mode,
                    cargo_quantity: r.cargo_quantity.unwrap_or_default(),
                    observation: r.observation.clone(),
                    hours_on_site: r.hours_on_site.unwrap_or_default(),
                    authorized_by,
                    timestamp: r.departure_at.unwrap_or(r.arrival_at),
                })
            }
            _ => return,
        };
        self.event_bus.publish(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::checkpoint::request::{CargoDeclaration, InputMode};
    use crate::application::checkpoint::ResetScope;
    use crate::application::events::create_event_bus;
    use crate::config::SiteConfig;
    use crate::domain::{BadgePayload, FleetProfile, SessionFilter, SystemSettings, Worker, WorkerRole};
    use crate::infrastructure::crypto::hash_pin;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use crate::shared::{ManualClock, PageRequest};
    use chrono::{DateTime, TimeZone, Utc};

    struct Fixture {
        service: Arc<CheckpointService>,
        repos: Arc<InMemoryRepositoryProvider>,
        clock: ManualClock,
        bus: SharedEventBus,
        admin: Worker,
        supervisor: Worker,
        plain: Worker,
        worker: Worker,
        fleet: FleetProfile,
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, h, m, 0).unwrap()
    }

    fn person(name: &str, doc: &str, role: WorkerRole, pin: &str) -> Worker {
        Worker::new(
            name,
            Some(doc.to_string()),
            format!("{}@site.io", doc.to_lowercase()),
            hash_pin(pin).unwrap(),
            role,
        )
    }

    async fn fixture() -> Fixture {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let clock = ManualClock::new(at(9, 0));
        let bus = create_event_bus();
        let settings = SettingsService::new(
            repos.clone(),
            SystemSettings::from(&SiteConfig::default()),
            bus.clone(),
        );

        let admin = person("Admin", "ADM-1", WorkerRole::Admin, "9999");
        let supervisor = person("Sup", "SUP-1", WorkerRole::Supervisor, "2222");
        let plain = person("Plain", "WRK-9", WorkerRole::Worker, "3333");
        let worker = person("Walter", "W-100", WorkerRole::Worker, "1234");
        for w in [&admin, &supervisor, &plain, &worker] {
            repos.workers().create(w.clone()).await.unwrap();
        }
        let fleet = FleetProfile::new("Fabio", "TR-7", hash_pin("5555").unwrap(), "Sur");
        repos.fleet_profiles().create(fleet.clone()).await.unwrap();

        let service = Arc::new(CheckpointService::new(
            repos.clone(),
            settings,
            bus.clone(),
            Arc::new(clock.clone()),
        ));
        Fixture {
            service,
            repos,
            clock,
            bus,
            admin,
            supervisor,
            plain,
            worker,
            fleet,
        }
    }

    fn inside() -> GeoPoint {
        GeoPoint::new(0.0003, 0.0003)
    }

    fn manual(identifier: &str, subject_pin: &str, authorizer_pin: &str, direction: Direction) -> RegistrationRequest {
        RegistrationRequest {
            mode: InputMode::Manual,
            direction,
            identifier: identifier.to_string(),
            subject_pin: Some(subject_pin.to_string()),
            authorizer_pin: authorizer_pin.to_string(),
            position: inside(),
            cargo: None,
        }
    }

    fn scanned(kind: SubjectKind, doc: &str, pin: &str, direction: Direction, now: DateTime<Utc>) -> RegistrationRequest {
        RegistrationRequest {
            mode: InputMode::Scanner,
            direction,
            identifier: BadgePayload::new(kind, doc, now).encode(),
            subject_pin: None,
            authorizer_pin: pin.to_string(),
            position: inside(),
            cargo: None,
        }
    }

    async fn open_sessions(f: &Fixture) -> usize {
        f.repos.attendance().list_open().await.unwrap().len()
    }

    #[tokio::test]
    async fn scenario_a_manual_entry_by_admin() {
        let f = fixture().await;
        let mut events = f.bus.subscribe();

        let receipt = f
            .service
            .register(&f.admin.id, manual("W-100", "1234", "9999", Direction::Entry))
            .await
            .unwrap();

        match &receipt.outcome {
            RegistrationOutcome::WorkerCheckedIn(s) => {
                assert_eq!(s.entry_at, at(9, 0));
                assert!(s.entry_signature.starts_with("Admin | DOC ADM-1 | ADMIN"));
            }
            other => panic!("unexpected {:?}", other),
        }
        let w = f.repos.workers().find_by_id(&f.worker.id).await.unwrap().unwrap();
        assert!(w.on_site);
        assert_eq!(w.last_entry_at, Some(at(9, 0)));

        let msg = events.recv().await.unwrap();
        assert_eq!(msg.event.event_type(), "worker_checked_in");
        assert_eq!(msg.event.subject_id(), Some(f.worker.id.as_str()));
    }

    #[tokio::test]
    async fn scenario_b_second_entry_rejected() {
        let f = fixture().await;
        f.service
            .register(&f.admin.id, manual("W-100", "1234", "9999", Direction::Entry))
            .await
            .unwrap();

        f.clock.set(at(9, 5));
        let err = f
            .service
            .register(&f.admin.id, manual("W-100", "1234", "9999", Direction::Entry))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "YA TIENE UNA ENTRADA ACTIVA");
        assert_eq!(open_sessions(&f).await, 1);
    }

    #[tokio::test]
    async fn scenario_c_exit_computes_hours() {
        let f = fixture().await;
        f.service
            .register(&f.admin.id, manual("W-100", "1234", "9999", Direction::Entry))
            .await
            .unwrap();

        f.clock.set(at(17, 0));
        let receipt = f
            .service
            .register(
                &f.supervisor.id,
                scanned(SubjectKind::Worker, "W-100", "2222", Direction::Exit, at(17, 0)),
            )
            .await
            .unwrap();

        match receipt.outcome {
            RegistrationOutcome::WorkerCheckedOut(s) => {
                assert_eq!(s.hours_worked, Some(8.00));
                assert_eq!(s.exit_at, Some(at(17, 0)));
            }
            other => panic!("unexpected {:?}", other),
        }
        let w = f.repos.workers().find_by_id(&f.worker.id).await.unwrap().unwrap();
        assert!(!w.on_site);
        assert_eq!(w.last_exit_at, Some(at(17, 0)));
        assert_eq!(open_sessions(&f).await, 0);
    }

    #[tokio::test]
    async fn scenario_d_fleet_exit_in_two_steps() {
        let f = fixture().await;
        f.service
            .register(
                &f.supervisor.id,
                scanned(SubjectKind::Fleet, "TR-7", "2222", Direction::Entry, at(9, 0)),
            )
            .await
            .unwrap();

        f.clock.set(at(10, 30));
        let first = f
            .service
            .register(
                &f.supervisor.id,
                scanned(SubjectKind::Fleet, "TR-7", "2222", Direction::Exit, at(10, 30)),
            )
            .await
            .unwrap();
        assert!(matches!(first.outcome, RegistrationOutcome::CargoInputRequired(_)));
        assert!(f
            .repos
            .fleet_access()
            .find_open_for_profile(&f.fleet.id)
            .await
            .unwrap()
            .is_some());

        let mut second = scanned(SubjectKind::Fleet, "TR-7", "2222", Direction::Exit, at(10, 30));
        second.cargo = Some(CargoDeclaration {
            cargo_quantity: Some(12),
            observation: Some("sin novedad".into()),
        });
        let done = f.service.register(&f.supervisor.id, second).await.unwrap();
        match done.outcome {
            RegistrationOutcome::FleetDispatched(r) => {
                assert_eq!(r.cargo_quantity, Some(12));
                assert_eq!(r.hours_on_site, Some(1.5));
                assert_eq!(r.observation.as_deref(), Some("sin novedad"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(f
            .repos
            .fleet_access()
            .find_open_for_profile(&f.fleet.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn scenario_e_wrong_authorizer_pin() {
        let f = fixture().await;
        let err = f
            .service
            .register(&f.admin.id, manual("W-100", "1234", "0000", Direction::Entry))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "PIN INCORRECTO");
        assert_eq!(err.reset_scope(), ResetScope::AuthorizerPin);
        assert_eq!(open_sessions(&f).await, 0);
        let w = f.repos.workers().find_by_id(&f.worker.id).await.unwrap().unwrap();
        assert!(!w.on_site);
    }

    #[tokio::test]
    async fn outside_geofence_never_writes() {
        let f = fixture().await;
        let mut req = manual("W-100", "1234", "9999", Direction::Entry);
        req.position = GeoPoint::new(0.01, 0.0);

        match f.service.register(&f.admin.id, req).await.unwrap_err() {
            CheckpointError::GeofenceViolation { distance_m, radius_m } => {
                assert!(distance_m > 1000.0);
                assert_eq!(radius_m, 100.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(open_sessions(&f).await, 0);
    }

    #[tokio::test]
    async fn worker_role_rejected_in_every_mode() {
        let f = fixture().await;
        let requests = vec![
            manual("W-100", "1234", "3333", Direction::Entry),
            scanned(SubjectKind::Worker, "W-100", "3333", Direction::Entry, at(9, 0)),
            RegistrationRequest {
                mode: InputMode::Camera,
                ..scanned(SubjectKind::Worker, "W-100", "3333", Direction::Entry, at(9, 0))
            },
        ];
        for req in requests {
            let err = f.service.register(&f.plain.id, req).await.unwrap_err();
            assert!(matches!(err, CheckpointError::InsufficientRole(_)), "{:?}", err);
        }
        assert_eq!(open_sessions(&f).await, 0);
    }

    #[tokio::test]
    async fn supervisor_cannot_use_manual_mode() {
        let f = fixture().await;
        let err = f
            .service
            .register(&f.supervisor.id, manual("W-100", "1234", "2222", Direction::Entry))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckpointError::InsufficientRole(_)));
    }

    #[tokio::test]
    async fn wrong_subject_pin_resets_only_subject_pin() {
        let f = fixture().await;
        let err = f
            .service
            .register(&f.admin.id, manual("W-100", "4321", "9999", Direction::Entry))
            .await
            .unwrap_err();
        assert_eq!(err, CheckpointError::SubjectPinMismatch(SubjectKind::Worker));
        assert_eq!(err.reset_scope(), ResetScope::SubjectPin);
    }

    #[tokio::test]
    async fn exit_without_entry_rejected_in_any_mode() {
        let f = fixture().await;
        let err = f
            .service
            .register(&f.admin.id, manual("W-100", "1234", "9999", Direction::Exit))
            .await
            .unwrap_err();
        assert_eq!(err, CheckpointError::NoActiveEntry);

        let err = f
            .service
            .register(
                &f.supervisor.id,
                scanned(SubjectKind::Fleet, "TR-7", "2222", Direction::Exit, at(9, 0)),
            )
            .await
            .unwrap_err();
        assert_eq!(err, CheckpointError::NoActiveEntry);
    }

    #[tokio::test]
    async fn concurrent_entries_open_one_session() {
        let f = fixture().await;
        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = f.service.clone();
            let operator = f.supervisor.id.clone();
            let req = scanned(SubjectKind::Worker, "W-100", "2222", Direction::Entry, at(9, 0));
            handles.push(tokio::spawn(async move { service.register(&operator, req).await }));
        }

        let mut ok = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => assert_eq!(e, CheckpointError::DuplicateEntry),
            }
        }
        assert_eq!(ok, 1);
        let sessions = f
            .repos
            .attendance()
            .list(
                SessionFilter {
                    worker_id: Some(f.worker.id.clone()),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(sessions.total, 1);
        assert!(f.service.locks.is_empty());
    }

    #[tokio::test]
    async fn subject_locks_are_released() {
        let f = fixture().await;
        f.service
            .register(&f.admin.id, manual("W-100", "1234", "9999", Direction::Entry))
            .await
            .unwrap();
        f.service
            .register(&f.admin.id, manual("W-100", "1234", "9999", Direction::Entry))
            .await
            .unwrap_err();
        f.service
            .register(&f.admin.id, manual("TR-7", "5555", "9999", Direction::Entry))
            .await
            .unwrap();
        assert!(f.service.locks.is_empty());
    }

    #[tokio::test]
    async fn rejection_is_published() {
        let f = fixture().await;
        let mut events = f.bus.subscribe();
        let _ = f
            .service
            .register(&f.admin.id, manual("W-100", "1234", "0000", Direction::Entry))
            .await;

        let msg = events.recv().await.unwrap();
        assert_eq!(msg.event.event_type(), "registration_rejected");
        assert_eq!(msg.event.subject_id(), Some(f.worker.id.as_str()));
    }

    #[tokio::test]
    async fn measure_reports_distance_outside() {
        let f = fixture().await;
        let check = f.service.measure(GeoPoint::new(0.01, 0.0)).await.unwrap();
        assert!(!check.inside);
        assert_eq!(
            f.service.measure(GeoPoint::new(95.0, 0.0)).await.unwrap_err(),
            CheckpointError::InvalidCoordinates
        );
    }
}
