//! Badge issuing: QR payloads for workers and fleet profiles

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::settings::SettingsService;
use crate::domain::{
    AccessSubject, BadgePayload, DomainError, DomainResult, RepositoryProvider, Subject,
};
use crate::shared::SharedClock;

/// A freshly stamped badge ready to be rendered as a QR code
#[derive(Debug, Clone)]
pub struct IssuedBadge {
    pub subject: Subject,
    pub payload: BadgePayload,
    /// `None` when badge rotation is disabled
    pub expires_at: Option<DateTime<Utc>>,
}

impl IssuedBadge {
    pub fn encoded(&self) -> String {
        self.payload.encode()
    }
}

pub struct BadgeIssuer {
    repos: Arc<dyn RepositoryProvider>,
    settings: SettingsService,
    clock: SharedClock,
}

impl BadgeIssuer {
    pub fn new(repos: Arc<dyn RepositoryProvider>, settings: SettingsService, clock: SharedClock) -> Self {
        Self {
            repos,
            settings,
            clock,
        }
    }

    pub async fn for_worker(&self, worker_id: &str) -> DomainResult<IssuedBadge> {
        let worker = self
            .repos
            .workers()
            .find_by_id(worker_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Worker", "id", worker_id))?;
        if !worker.has_document() {
            return Err(DomainError::Validation(
                "Worker has no document id; a badge cannot be issued".into(),
            ));
        }
        self.issue(Subject::Worker(worker)).await
    }

    pub async fn for_fleet(&self, profile_id: &str) -> DomainResult<IssuedBadge> {
        let profile = self
            .repos
            .fleet_profiles()
            .find_by_id(profile_id)
            .await?
            .ok_or_else(|| DomainError::not_found("FleetProfile", "id", profile_id))?;
        self.issue(Subject::Fleet(profile)).await
    }

    async fn issue(&self, subject: Subject) -> DomainResult<IssuedBadge> {
        if !subject.is_active() {
            return Err(DomainError::Validation(format!(
                "{} is inactive; a badge cannot be issued",
                subject.display_name()
            )));
        }
        let document_id = subject
            .document_id()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| DomainError::Validation("Missing document id".into()))?
            .to_string();

        let ttl = self.settings.current().await?.qr_token_ttl_secs;
        let payload = BadgePayload::new(subject.kind(), document_id, self.clock.now());
        Ok(IssuedBadge {
            expires_at: payload.expires_at(ttl),
            subject,
            payload,
        })
    }
}
