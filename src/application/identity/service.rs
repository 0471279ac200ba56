//! Identity service: application-layer orchestration
//!
//! HTTP handlers should be thin wrappers that delegate to this service.

use std::sync::Arc;

use tracing::info;

use crate::domain::{DomainError, DomainResult, RepositoryProvider, Worker};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password};

const MIN_PASSWORD_LEN: usize = 8;

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub worker: Worker,
}

pub struct IdentityService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
}

impl IdentityService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: JwtConfig) -> Self {
        Self { repos, jwt_config }
    }

    /// Authenticate by email or document id + password and return a JWT.
    pub async fn login(&self, login: &str, password: &str) -> DomainResult<AuthResult> {
        let login = login.trim();
        let worker = match self.repos.workers().find_by_email(login).await? {
            Some(w) => Some(w),
            None => self.repos.workers().find_by_document(login).await?,
        };

        let Some(worker) = worker else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };
        let Some(ref hash) = worker.password_hash else {
            return Err(DomainError::Unauthorized("Console access not enabled".into()));
        };
        if !worker.is_active {
            return Err(DomainError::Unauthorized("Account is disabled".into()));
        }
        if !verify_password(password, hash).unwrap_or(false) {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        let token = create_token(&worker.id, &worker.email, worker.role.as_str(), &self.jwt_config)
            .map_err(|e| DomainError::Validation(format!("Failed to create token: {}", e)))?;

        info!(worker_id = %worker.id, role = %worker.role, "Operator logged in");
        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            worker,
        })
    }

    /// Current operator; a deactivated account is treated as logged out.
    pub async fn me(&self, worker_id: &str) -> DomainResult<Worker> {
        let worker = self
            .repos
            .workers()
            .find_by_id(worker_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Worker", "id", worker_id))?;
        if !worker.is_active {
            return Err(DomainError::Unauthorized("Account is disabled".into()));
        }
        Ok(worker)
    }

    /// Verifies the current password first.
    pub async fn change_password(
        &self,
        worker_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "New password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let mut worker = self.me(worker_id).await?;
        let valid = worker
            .password_hash
            .as_deref()
            .map(|h| verify_password(current_password, h).unwrap_or(false))
            .unwrap_or(false);
        if !valid {
            return Err(DomainError::Unauthorized("Invalid current password".into()));
        }

        worker.password_hash = Some(
            hash_password(new_password)
                .map_err(|e| DomainError::Validation(format!("Failed to hash password: {}", e)))?,
        );
        worker.updated_at = chrono::Utc::now();
        self.repos.workers().update(worker).await?;

        info!(worker_id, "Password changed");
        Ok(())
    }
}
