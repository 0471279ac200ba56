//! Authentication DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::checkpoint::authorization::can_operate;
use crate::domain::Worker;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Email or document id
    #[validate(length(min = 1, max = 120, message = "login is required"))]
    pub login: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub operator: OperatorInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OperatorInfo {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub document_id: Option<String>,
    pub role: String,
    /// May co-sign check-ins from the console
    pub can_operate: bool,
    pub on_site: bool,
    pub last_entry_at: Option<DateTime<Utc>>,
}

impl From<Worker> for OperatorInfo {
    fn from(w: Worker) -> Self {
        Self {
            can_operate: can_operate(w.role),
            role: w.role.as_str().to_string(),
            id: w.id,
            full_name: w.full_name,
            email: w.email,
            document_id: w.document_id,
            on_site: w.on_site,
            last_entry_at: w.last_entry_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, max = 128, message = "new password must be 8-128 characters"))]
    pub new_password: String,
}
