//! Maps a scanned or typed identifier to exactly one subject

use chrono::{DateTime, Utc};
use tracing::debug;

use super::error::CheckpointError;
use super::request::InputMode;
use crate::domain::{
    BadgeError, BadgePayload, FleetProfile, RepositoryProvider, Subject, SubjectKind, Worker,
};

pub struct EntityResolver<'a> {
    repos: &'a dyn RepositoryProvider,
}

impl<'a> EntityResolver<'a> {
    pub fn new(repos: &'a dyn RepositoryProvider) -> Self {
        Self { repos }
    }

    /// Badge modes decode the payload and use its prefix as the kind hint.
    /// Manual mode tries workers first, then fleet profiles.
    pub async fn resolve(
        &self,
        identifier: &str,
        mode: InputMode,
        now: DateTime<Utc>,
        badge_ttl_secs: i64,
    ) -> Result<Subject, CheckpointError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(CheckpointError::EntityNotFound(String::new()));
        }

        if mode.reads_badge() {
            let badge = BadgePayload::decode(identifier).map_err(badge_error)?;
            badge.check_fresh(now, badge_ttl_secs).map_err(badge_error)?;
            debug!(kind = %badge.kind, document_id = %badge.document_id, "Badge decoded");
            return self.resolve_kind(&badge.document_id, Some(badge.kind)).await;
        }

        self.resolve_kind(identifier, None).await
    }

    /// A kind hint comes from a badge, so its document id must match exactly.
    pub async fn resolve_kind(
        &self,
        identifier: &str,
        hint: Option<SubjectKind>,
    ) -> Result<Subject, CheckpointError> {
        match hint {
            Some(SubjectKind::Worker) => {
                self.resolve_badge_worker(identifier).await.map(Subject::Worker)
            }
            Some(SubjectKind::Fleet) => self.resolve_fleet(identifier).await.map(Subject::Fleet),
            None => match self.resolve_worker(identifier).await {
                Err(CheckpointError::EntityNotFound(_)) => {
                    self.resolve_fleet(identifier).await.map(Subject::Fleet)
                }
                other => other.map(Subject::Worker),
            },
        }
    }

    async fn resolve_worker(&self, identifier: &str) -> Result<Worker, CheckpointError> {
        let candidates = self.repos.workers().search_identifier(identifier).await?;
        admit_worker(pick_worker(identifier, candidates)?)
    }

    async fn resolve_badge_worker(&self, document_id: &str) -> Result<Worker, CheckpointError> {
        let mut matches: Vec<Worker> = self
            .repos
            .workers()
            .search_identifier(document_id)
            .await?
            .into_iter()
            .filter(|w| w.matches_document(document_id))
            .collect();

        let worker = match matches.len() {
            0 => return Err(CheckpointError::EntityNotFound(document_id.to_string())),
            1 => matches.remove(0),
            n => return Err(CheckpointError::AmbiguousIdentifier(n)),
        };
        admit_worker(worker)
    }

    async fn resolve_fleet(&self, document_id: &str) -> Result<FleetProfile, CheckpointError> {
        let profile = self
            .repos
            .fleet_profiles()
            .find_by_document(document_id)
            .await?
            .ok_or_else(|| CheckpointError::EntityNotFound(document_id.to_string()))?;

        if !profile.is_active {
            return Err(CheckpointError::FleetInactive);
        }
        Ok(profile)
    }
}

fn admit_worker(worker: Worker) -> Result<Worker, CheckpointError> {
    if !worker.has_document() {
        return Err(CheckpointError::WorkerMissingDocument);
    }
    if !worker.is_active {
        return Err(CheckpointError::WorkerInactive);
    }
    Ok(worker)
}

/// An exact (case-insensitive) match wins over partial ones; several
/// partial matches without an exact one are ambiguous.
fn pick_worker(identifier: &str, candidates: Vec<Worker>) -> Result<Worker, CheckpointError> {
    let (mut exact, mut partial): (Vec<Worker>, Vec<Worker>) = candidates
        .into_iter()
        .partition(|w| w.matches_exactly(identifier));

    match exact.len() {
        1 => return Ok(exact.remove(0)),
        0 => {}
        n => return Err(CheckpointError::AmbiguousIdentifier(n)),
    }
    match partial.len() {
        0 => Err(CheckpointError::EntityNotFound(identifier.to_string())),
        1 => Ok(partial.remove(0)),
        n => Err(CheckpointError::AmbiguousIdentifier(n)),
    }
}

fn badge_error(e: BadgeError) -> CheckpointError {
    match e {
        BadgeError::Expired => CheckpointError::BadgeExpired,
        BadgeError::Malformed | BadgeError::UnknownPrefix(_) => CheckpointError::InvalidBadge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessSubject, WorkerRole};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
    }

    async fn seeded() -> InMemoryRepositoryProvider {
        let repos = InMemoryRepositoryProvider::new();
        let workers = repos.workers();
        workers
            .create(Worker::new("Ana Torres", Some("7001".into()), "ana@site.io", "h", WorkerRole::Worker))
            .await
            .unwrap();
        workers
            .create(Worker::new("Ana Ruiz", Some("70012".into()), "ruiz@site.io", "h", WorkerRole::Worker))
            .await
            .unwrap();
        workers
            .create(Worker::new("Pedro Sol", None, "pedro@site.io", "h", WorkerRole::Worker))
            .await
            .unwrap();
        let mut inactive = Worker::new("Old Hand", Some("5000".into()), "old@site.io", "h", WorkerRole::Worker);
        inactive.is_active = false;
        workers.create(inactive).await.unwrap();

        repos
            .fleet_profiles()
            .create(FleetProfile::new("Luis Vera", "TR-900", "h", "Transportes Sur"))
            .await
            .unwrap();
        let mut parked = FleetProfile::new("Rosa Paz", "TR-901", "h", "Transportes Sur");
        parked.is_active = false;
        repos.fleet_profiles().create(parked).await.unwrap();
        repos
    }

    #[tokio::test]
    async fn exact_match_beats_partial() {
        let repos = seeded().await;
        let resolver = EntityResolver::new(&repos);
        let s = resolver.resolve("7001", InputMode::Manual, now(), 0).await.unwrap();
        assert_eq!(s.display_name(), "Ana Torres");
    }

    #[tokio::test]
    async fn email_match_is_case_insensitive() {
        let repos = seeded().await;
        let resolver = EntityResolver::new(&repos);
        let s = resolver.resolve("RUIZ@SITE.IO", InputMode::Manual, now(), 0).await.unwrap();
        assert_eq!(s.display_name(), "Ana Ruiz");
    }

    #[tokio::test]
    async fn several_partial_matches_are_ambiguous() {
        let repos = seeded().await;
        let resolver = EntityResolver::new(&repos);
        let err = resolver.resolve("700", InputMode::Manual, now(), 0).await.unwrap_err();
        assert_eq!(err, CheckpointError::AmbiguousIdentifier(2));
    }

    #[tokio::test]
    async fn worker_rejections() {
        let repos = seeded().await;
        let resolver = EntityResolver::new(&repos);
        assert_eq!(
            resolver.resolve("pedro@site.io", InputMode::Manual, now(), 0).await.unwrap_err(),
            CheckpointError::WorkerMissingDocument
        );
        assert_eq!(
            resolver.resolve("5000", InputMode::Manual, now(), 0).await.unwrap_err(),
            CheckpointError::WorkerInactive
        );
    }

    #[tokio::test]
    async fn manual_mode_falls_back_to_fleet() {
        let repos = seeded().await;
        let resolver = EntityResolver::new(&repos);
        let s = resolver.resolve("TR-900", InputMode::Manual, now(), 0).await.unwrap();
        assert_eq!(s.kind(), SubjectKind::Fleet);

        assert_eq!(
            resolver.resolve("TR-901", InputMode::Manual, now(), 0).await.unwrap_err(),
            CheckpointError::FleetInactive
        );
        assert!(matches!(
            resolver.resolve("nobody", InputMode::Manual, now(), 0).await.unwrap_err(),
            CheckpointError::EntityNotFound(_)
        ));
    }

    #[tokio::test]
    async fn badge_prefix_selects_table() {
        let repos = seeded().await;
        let resolver = EntityResolver::new(&repos);

        let badge = BadgePayload::new(SubjectKind::Fleet, "TR-900", now()).encode();
        let s = resolver.resolve(&badge, InputMode::Scanner, now(), 0).await.unwrap();
        assert_eq!(s.kind(), SubjectKind::Fleet);

        // fleet document never resolves through the worker table
        let badge = BadgePayload::new(SubjectKind::Worker, "TR-900", now()).encode();
        assert!(matches!(
            resolver.resolve(&badge, InputMode::Camera, now(), 0).await.unwrap_err(),
            CheckpointError::EntityNotFound(_)
        ));
    }

    #[tokio::test]
    async fn worker_badge_needs_exact_document() {
        let repos = seeded().await;
        let resolver = EntityResolver::new(&repos);

        let badge = BadgePayload::new(SubjectKind::Worker, "7001", now()).encode();
        let s = resolver.resolve(&badge, InputMode::Scanner, now(), 0).await.unwrap();
        assert_eq!(s.display_name(), "Ana Torres");

        // "700" is only a prefix of 7001 and 70012
        let badge = BadgePayload::new(SubjectKind::Worker, "700", now()).encode();
        assert_eq!(
            resolver.resolve(&badge, InputMode::Scanner, now(), 0).await.unwrap_err(),
            CheckpointError::EntityNotFound("700".into())
        );

        // an email fragment is not a document id
        let badge = BadgePayload::new(SubjectKind::Worker, "ruiz@site.io", now()).encode();
        assert!(matches!(
            resolver.resolve(&badge, InputMode::Camera, now(), 0).await.unwrap_err(),
            CheckpointError::EntityNotFound(_)
        ));
    }

    #[tokio::test]
    async fn oversized_badge_timestamp_is_invalid() {
        let repos = seeded().await;
        let resolver = EntityResolver::new(&repos);
        assert_eq!(
            resolver
                .resolve("P|7001|8210266876799", InputMode::Scanner, now(), 300)
                .await
                .unwrap_err(),
            CheckpointError::InvalidBadge
        );
    }

    #[tokio::test]
    async fn badge_errors() {
        let repos = seeded().await;
        let resolver = EntityResolver::new(&repos);

        assert_eq!(
            resolver.resolve("7001", InputMode::Scanner, now(), 0).await.unwrap_err(),
            CheckpointError::InvalidBadge
        );

        let stale = BadgePayload::new(SubjectKind::Worker, "7001", now() - chrono::Duration::minutes(10));
        assert_eq!(
            resolver
                .resolve(&stale.encode(), InputMode::Scanner, now(), 300)
                .await
                .unwrap_err(),
            CheckpointError::BadgeExpired
        );
    }
}
