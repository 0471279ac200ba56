//! Worker DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::services::NewWorker;
use crate::domain::{DomainError, Worker, WorkerFilter, WorkerRole, WorkerUpdate};

/// Worker API representation; secrets never leave the server
#[derive(Debug, Serialize, ToSchema)]
pub struct WorkerDto {
    pub id: String,
    pub full_name: String,
    pub document_id: Option<String>,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub on_site: bool,
    pub console_access: bool,
    pub last_entry_at: Option<DateTime<Utc>>,
    pub last_exit_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Worker> for WorkerDto {
    fn from(w: Worker) -> Self {
        Self {
            role: w.role.as_str().to_string(),
            console_access: w.password_hash.is_some(),
            id: w.id,
            full_name: w.full_name,
            document_id: w.document_id,
            email: w.email,
            is_active: w.is_active,
            on_site: w.on_site,
            last_entry_at: w.last_entry_at,
            last_exit_at: w.last_exit_at,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

pub(crate) fn parse_role(raw: &str) -> Result<WorkerRole, DomainError> {
    WorkerRole::parse(raw).ok_or_else(|| {
        DomainError::Validation(format!(
            "Unknown role '{}' (expected worker, supervisor or admin)",
            raw
        ))
    })
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWorkerRequest {
    #[validate(length(min = 1, max = 120, message = "full name is required"))]
    pub full_name: String,
    #[validate(length(max = 40), does_not_contain(pattern = "|"))]
    pub document_id: Option<String>,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    /// 4-8 digit security PIN
    #[validate(length(min = 4, max = 8, message = "PIN must be 4-8 digits"))]
    pub pin: String,
    #[serde(default = "default_role")]
    pub role: String,
    /// Enables console login
    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: Option<String>,
}

fn default_role() -> String {
    "worker".to_string()
}

impl CreateWorkerRequest {
    pub fn into_new_worker(self) -> Result<NewWorker, DomainError> {
        Ok(NewWorker {
            role: parse_role(&self.role)?,
            full_name: self.full_name,
            document_id: self.document_id,
            email: self.email,
            pin: self.pin,
            password: self.password,
        })
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkerRequest {
    #[validate(length(min = 1, max = 120))]
    pub full_name: Option<String>,
    #[validate(length(max = 40), does_not_contain(pattern = "|"))]
    pub document_id: Option<String>,
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateWorkerRequest {
    pub fn into_update(self) -> Result<WorkerUpdate, DomainError> {
        Ok(WorkerUpdate {
            role: self.role.as_deref().map(parse_role).transpose()?,
            full_name: self.full_name,
            document_id: self.document_id,
            email: self.email,
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetPinRequest {
    #[validate(length(min = 4, max = 8, message = "PIN must be 4-8 digits"))]
    pub pin: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetPasswordRequest {
    /// `null` revokes console access
    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListWorkersParams {
    /// Search in name, email and document id
    pub search: Option<String>,
    /// worker, supervisor or admin
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub on_site: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ListWorkersParams {
    pub fn filter(&self) -> Result<WorkerFilter, DomainError> {
        Ok(WorkerFilter {
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            role: self.role.as_deref().map(parse_role).transpose()?,
            is_active: self.is_active,
            on_site: self.on_site,
        })
    }
}
