//! Dual-authorization gate
//!
//! The subject proves identity with their own PIN in manual mode; the
//! logged-in operator always co-signs with theirs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::CheckpointError;
use super::request::InputMode;
use crate::domain::{AccessSubject, RepositoryProvider, Worker, WorkerRole};
use crate::infrastructure::crypto::verify_pin;

/// Audit stamp of the operator who co-signed a transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorizerSignature {
    pub worker_id: String,
    pub full_name: String,
    pub document_id: Option<String>,
    pub role: String,
    pub signed_at: DateTime<Utc>,
}

impl AuthorizerSignature {
    pub fn new(authorizer: &Worker, signed_at: DateTime<Utc>) -> Self {
        Self {
            worker_id: authorizer.id.clone(),
            full_name: authorizer.full_name.clone(),
            document_id: authorizer.document_id.clone(),
            role: authorizer.role.as_str().to_string(),
            signed_at,
        }
    }
}

impl std::fmt::Display for AuthorizerSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | DOC {} | {} | {}",
            self.full_name,
            self.document_id.as_deref().unwrap_or("S/N"),
            self.role.to_uppercase(),
            self.signed_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

pub fn verify_subject_pin(
    subject: &dyn AccessSubject,
    mode: InputMode,
    pin: Option<&str>,
) -> Result<(), CheckpointError> {
    if !mode.requires_subject_pin() {
        return Ok(());
    }
    let pin = pin
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(CheckpointError::SubjectPinRequired(subject.kind()))?;

    if !verify_pin(pin, subject.pin_hash()) {
        return Err(CheckpointError::SubjectPinMismatch(subject.kind()));
    }
    Ok(())
}

/// Look up the operator by id and check PIN and role for `mode`.
pub async fn authorize_operator(
    repos: &dyn RepositoryProvider,
    operator_id: &str,
    pin: &str,
    mode: InputMode,
    now: DateTime<Utc>,
) -> Result<(Worker, AuthorizerSignature), CheckpointError> {
    let authorizer = repos
        .workers()
        .find_by_id(operator_id)
        .await?
        .ok_or(CheckpointError::AuthorizerNotFound)?;

    if !authorizer.is_active {
        return Err(CheckpointError::AuthorizerInactive);
    }
    if !verify_pin(pin, &authorizer.pin_hash) {
        return Err(CheckpointError::AuthorizerPinMismatch);
    }
    if !mode.permits(authorizer.role) {
        return Err(CheckpointError::InsufficientRole(mode.as_str().to_uppercase()));
    }

    let signature = AuthorizerSignature::new(&authorizer, now);
    Ok((authorizer, signature))
}

/// Roles that may operate the checkpoint in at least one mode
pub fn can_operate(role: WorkerRole) -> bool {
    [InputMode::Manual, InputMode::Scanner, InputMode::Camera]
        .iter()
        .any(|m| m.permits(role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FleetProfile;
    use crate::infrastructure::crypto::hash_pin;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    fn worker(role: WorkerRole, pin: &str) -> Worker {
        Worker::new("Op", Some("OP-1".into()), "op@site.io", hash_pin(pin).unwrap(), role)
    }

    #[test]
    fn subject_pin_only_checked_in_manual_mode() {
        let w = worker(WorkerRole::Worker, "1234");
        assert!(verify_subject_pin(&w, InputMode::Scanner, None).is_ok());
        assert!(verify_subject_pin(&w, InputMode::Manual, Some("1234")).is_ok());
        assert_eq!(
            verify_subject_pin(&w, InputMode::Manual, Some("")),
            Err(CheckpointError::SubjectPinRequired(w.kind()))
        );
        assert_eq!(
            verify_subject_pin(&w, InputMode::Manual, Some("0000")),
            Err(CheckpointError::SubjectPinMismatch(w.kind()))
        );
    }

    #[test]
    fn fleet_uses_secret_pin() {
        let f = FleetProfile::new("Luis", "TR-1", hash_pin("5555").unwrap(), "Sur");
        assert!(verify_subject_pin(&f, InputMode::Manual, Some("5555")).is_ok());
        assert!(verify_subject_pin(&f, InputMode::Manual, Some("1234")).is_err());
    }

    #[tokio::test]
    async fn operator_checks_in_order() {
        let repos = InMemoryRepositoryProvider::new();
        let sup = worker(WorkerRole::Supervisor, "2222");
        let sup_id = sup.id.clone();
        repos.workers().create(sup).await.unwrap();
        let now = Utc::now();

        assert_eq!(
            authorize_operator(&repos, "ghost", "2222", InputMode::Scanner, now)
                .await
                .unwrap_err(),
            CheckpointError::AuthorizerNotFound
        );
        assert_eq!(
            authorize_operator(&repos, &sup_id, "0000", InputMode::Scanner, now)
                .await
                .unwrap_err(),
            CheckpointError::AuthorizerPinMismatch
        );
        assert!(matches!(
            authorize_operator(&repos, &sup_id, "2222", InputMode::Manual, now)
                .await
                .unwrap_err(),
            CheckpointError::InsufficientRole(_)
        ));

        let (op, sig) = authorize_operator(&repos, &sup_id, "2222", InputMode::Camera, now)
            .await
            .unwrap();
        assert_eq!(op.id, sup_id);
        assert!(sig.to_string().starts_with("Op | DOC OP-1 | SUPERVISOR |"));
    }

    #[tokio::test]
    async fn inactive_operator_rejected() {
        let repos = InMemoryRepositoryProvider::new();
        let mut admin = worker(WorkerRole::Admin, "9999");
        admin.is_active = false;
        let id = admin.id.clone();
        repos.workers().create(admin).await.unwrap();

        assert_eq!(
            authorize_operator(&repos, &id, "9999", InputMode::Manual, Utc::now())
                .await
                .unwrap_err(),
            CheckpointError::AuthorizerInactive
        );
    }

    #[test]
    fn plain_workers_cannot_operate() {
        assert!(!can_operate(WorkerRole::Worker));
        assert!(can_operate(WorkerRole::Supervisor));
    }
}
