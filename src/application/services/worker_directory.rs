//! Worker directory: admin CRUD over workers

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    DomainError, DomainResult, RepositoryProvider, Worker, WorkerFilter, WorkerRole, WorkerUpdate,
};
use crate::infrastructure::crypto::{hash_password, hash_pin};
use crate::shared::{is_valid_document_id, is_valid_pin, PageRequest, PaginatedResult};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct NewWorker {
    pub full_name: String,
    pub document_id: Option<String>,
    pub email: String,
    pub pin: String,
    pub role: WorkerRole,
    /// Enables console login when present
    pub password: Option<String>,
}

pub struct WorkerDirectory {
    repos: Arc<dyn RepositoryProvider>,
}

impl WorkerDirectory {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn create(&self, input: NewWorker) -> DomainResult<Worker> {
        let full_name = input.full_name.trim();
        if full_name.is_empty() {
            return Err(DomainError::Validation("Full name is required".into()));
        }
        validate_email(&input.email)?;
        validate_document(input.document_id.as_deref())?;
        let pin_hash = hash_secret_pin(&input.pin)?;

        let document_id = input
            .document_id
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let mut worker = Worker::new(full_name, document_id, input.email.trim(), pin_hash, input.role);
        if let Some(password) = input.password {
            worker.password_hash = Some(hash_console_password(&password)?);
        }

        self.repos.workers().create(worker.clone()).await?;
        info!(worker_id = %worker.id, role = %worker.role, "Worker created");
        Ok(worker)
    }

    pub async fn get(&self, id: &str) -> DomainResult<Worker> {
        self.repos
            .workers()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Worker", "id", id))
    }

    pub async fn list(&self, filter: WorkerFilter, page: PageRequest) -> DomainResult<PaginatedResult<Worker>> {
        self.repos.workers().list(filter, page).await
    }

    pub async fn update(&self, id: &str, update: WorkerUpdate) -> DomainResult<Worker> {
        if let Some(ref email) = update.email {
            validate_email(email)?;
        }
        validate_document(update.document_id.as_deref())?;
        if let Some(ref name) = update.full_name {
            if name.trim().is_empty() {
                return Err(DomainError::Validation("Full name is required".into()));
            }
        }
        if update.is_active == Some(false) {
            return self.deactivate(id).await;
        }

        let mut worker = self.get(id).await?;
        update.apply(&mut worker);
        self.repos.workers().update(worker.clone()).await?;
        info!(worker_id = id, "Worker updated");
        Ok(worker)
    }

    pub async fn set_pin(&self, id: &str, pin: &str) -> DomainResult<()> {
        let mut worker = self.get(id).await?;
        worker.pin_hash = hash_secret_pin(pin)?;
        worker.updated_at = chrono::Utc::now();
        self.repos.workers().update(worker).await?;
        info!(worker_id = id, "Worker PIN changed");
        Ok(())
    }

    /// `None` revokes console access.
    pub async fn set_password(&self, id: &str, password: Option<&str>) -> DomainResult<()> {
        let mut worker = self.get(id).await?;
        worker.password_hash = password.map(hash_console_password).transpose()?;
        worker.updated_at = chrono::Utc::now();
        self.repos.workers().update(worker).await?;
        info!(worker_id = id, "Worker console password changed");
        Ok(())
    }

    /// Soft delete. Refused while the worker is on site, since an inactive
    /// worker can no longer be checked out.
    pub async fn deactivate(&self, id: &str) -> DomainResult<Worker> {
        let mut worker = self.get(id).await?;
        if worker.on_site {
            return Err(DomainError::Conflict(
                "Worker is on site; register the exit first".into(),
            ));
        }
        worker.is_active = false;
        worker.updated_at = chrono::Utc::now();
        self.repos.workers().update(worker.clone()).await?;
        info!(worker_id = id, "Worker deactivated");
        Ok(worker)
    }

    pub async fn reactivate(&self, id: &str) -> DomainResult<Worker> {
        let mut worker = self.get(id).await?;
        worker.is_active = true;
        worker.updated_at = chrono::Utc::now();
        self.repos.workers().update(worker.clone()).await?;
        info!(worker_id = id, "Worker reactivated");
        Ok(worker)
    }
}

fn validate_email(email: &str) -> DomainResult<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(DomainError::Validation("Invalid email address".into())),
    }
}

pub(crate) fn hash_secret_pin(pin: &str) -> DomainResult<String> {
    let pin = pin.trim();
    if !is_valid_pin(pin) {
        return Err(DomainError::Validation("PIN must be 4 to 8 digits".into()));
    }
    hash_pin(pin).map_err(|e| DomainError::Validation(format!("Failed to hash PIN: {}", e)))
}

fn hash_console_password(password: &str) -> DomainResult<String> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    hash_password(password).map_err(|e| DomainError::Validation(format!("Failed to hash password: {}", e)))
}

/// A blank document id is allowed and stored as none.
fn validate_document(document_id: Option<&str>) -> DomainResult<()> {
    match document_id {
        Some(doc) if !doc.trim().is_empty() && !is_valid_document_id(doc) => Err(
            DomainError::Validation("Document id cannot contain '|'".into()),
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::verify_pin;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    fn new_worker(email: &str, doc: &str) -> NewWorker {
        NewWorker {
            full_name: "Ana Torres".into(),
            document_id: Some(doc.into()),
            email: email.into(),
            pin: "1234".into(),
            role: WorkerRole::Worker,
            password: None,
        }
    }

    fn directory() -> (WorkerDirectory, Arc<InMemoryRepositoryProvider>) {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        (WorkerDirectory::new(repos.clone()), repos)
    }

    #[tokio::test]
    async fn document_with_badge_separator_is_rejected() {
        let (dir, repos) = directory();
        assert!(matches!(
            dir.create(new_worker("ana@site.io", "70|01")).await,
            Err(DomainError::Validation(_))
        ));
        assert_eq!(repos.workers().count().await.unwrap(), 0);

        let w = dir.create(new_worker("ana@site.io", "7001")).await.unwrap();
        let err = dir
            .update(
                &w.id,
                WorkerUpdate {
                    document_id: Some("P|7001".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(err, Err(DomainError::Validation(_))));
        assert_eq!(dir.get(&w.id).await.unwrap().document_id.as_deref(), Some("7001"));
    }

    #[tokio::test]
    async fn create_hashes_pin() {
        let (dir, _) = directory();
        let w = dir.create(new_worker("ana@site.io", "7001")).await.unwrap();
        assert_ne!(w.pin_hash, "1234");
        assert!(verify_pin("1234", &w.pin_hash));
        assert!(w.password_hash.is_none());
    }

    #[tokio::test]
    async fn create_validates_input() {
        let (dir, _) = directory();
        let mut bad_pin = new_worker("ana@site.io", "7001");
        bad_pin.pin = "12".into();
        assert!(matches!(dir.create(bad_pin).await, Err(DomainError::Validation(_))));

        assert!(dir.create(new_worker("not-an-email", "7001")).await.is_err());

        let mut short_pw = new_worker("ana@site.io", "7001");
        short_pw.password = Some("short".into());
        assert!(dir.create(short_pw).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_document_conflicts() {
        let (dir, _) = directory();
        dir.create(new_worker("a@site.io", "7001")).await.unwrap();
        assert!(matches!(
            dir.create(new_worker("b@site.io", "7001")).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn deactivate_refused_while_on_site() {
        let (dir, repos) = directory();
        let w = dir.create(new_worker("a@site.io", "7001")).await.unwrap();
        repos
            .workers()
            .set_presence(&w.id, true, chrono::Utc::now())
            .await
            .unwrap();
        assert!(matches!(dir.deactivate(&w.id).await, Err(DomainError::Conflict(_))));

        repos
            .workers()
            .set_presence(&w.id, false, chrono::Utc::now())
            .await
            .unwrap();
        assert!(!dir.deactivate(&w.id).await.unwrap().is_active);
        assert!(dir.reactivate(&w.id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn set_pin_and_password() {
        let (dir, _) = directory();
        let w = dir.create(new_worker("a@site.io", "7001")).await.unwrap();
        dir.set_pin(&w.id, "8765").await.unwrap();
        dir.set_password(&w.id, Some("console-pass")).await.unwrap();

        let w = dir.get(&w.id).await.unwrap();
        assert!(verify_pin("8765", &w.pin_hash));
        assert!(w.password_hash.is_some());

        dir.set_password(&w.id, None).await.unwrap();
        assert!(dir.get(&w.id).await.unwrap().password_hash.is_none());
    }
}
