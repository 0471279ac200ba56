use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::services::IssuedBadge;
use crate::domain::AccessSubject;

/// Badge content to render as a QR code
#[derive(Debug, Serialize, ToSchema)]
pub struct BadgeDto {
    /// worker | fleet
    pub subject_kind: String,
    pub subject_id: String,
    pub display_name: String,
    pub document_id: String,
    /// Base64 text to encode into the QR image
    pub payload: String,
    /// Decoded payload, for debugging and printed labels
    pub raw: String,
    pub issued_at: DateTime<Utc>,
    /// Absent when badges never expire
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<IssuedBadge> for BadgeDto {
    fn from(b: IssuedBadge) -> Self {
        Self {
            payload: b.encoded(),
            raw: b.payload.raw(),
            subject_kind: b.subject.kind().as_str().to_string(),
            subject_id: b.subject.subject_id().to_string(),
            display_name: b.subject.display_name().to_string(),
            document_id: b.payload.document_id.clone(),
            issued_at: b.payload.issued_at,
            expires_at: b.expires_at,
        }
    }
}
