//! QR badge payloads
//!
//! A badge encodes `<prefix>|<document_id>|<unix_ts>` and is displayed as
//! standard base64. Scanners may also hand over the raw, undecoded text.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use super::subject::SubjectKind;

const SEPARATOR: char = '|';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BadgeError {
    #[error("malformed badge payload")]
    Malformed,

    #[error("unknown badge prefix: {0}")]
    UnknownPrefix(String),

    #[error("badge expired")]
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgePayload {
    pub kind: SubjectKind,
    pub document_id: String,
    pub issued_at: DateTime<Utc>,
}

impl BadgePayload {
    pub fn new(kind: SubjectKind, document_id: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            document_id: document_id.into(),
            issued_at,
        }
    }

    /// Text form before encoding
    pub fn raw(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.kind.badge_prefix(),
            SEPARATOR,
            self.document_id,
            SEPARATOR,
            self.issued_at.timestamp()
        )
    }

    pub fn encode(&self) -> String {
        STANDARD.encode(self.raw())
    }

    /// Accepts either the base64 form or the raw text.
    pub fn decode(input: &str) -> Result<Self, BadgeError> {
        let input = input.trim();
        if input.contains(SEPARATOR) {
            return Self::parse_raw(input);
        }
        let bytes = STANDARD.decode(input).map_err(|_| BadgeError::Malformed)?;
        let text = String::from_utf8(bytes).map_err(|_| BadgeError::Malformed)?;
        Self::parse_raw(text.trim())
    }

    fn parse_raw(raw: &str) -> Result<Self, BadgeError> {
        let mut parts = raw.split(SEPARATOR);
        let (Some(prefix), Some(document_id), Some(ts), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(BadgeError::Malformed);
        };

        let kind = SubjectKind::from_badge_prefix(prefix)
            .ok_or_else(|| BadgeError::UnknownPrefix(prefix.to_string()))?;

        let document_id = document_id.trim();
        if document_id.is_empty() {
            return Err(BadgeError::Malformed);
        }

        let ts: i64 = ts.trim().parse().map_err(|_| BadgeError::Malformed)?;
        let issued_at = Utc
            .timestamp_opt(ts, 0)
            .single()
            .ok_or(BadgeError::Malformed)?;

        Ok(Self::new(kind, document_id, issued_at))
    }

    /// `None` when `ttl_secs <= 0` (badges never expire) or when the expiry
    /// is not representable.
    pub fn expires_at(&self, ttl_secs: i64) -> Option<DateTime<Utc>> {
        if ttl_secs <= 0 {
            return None;
        }
        chrono::Duration::try_seconds(ttl_secs)
            .and_then(|ttl| self.issued_at.checked_add_signed(ttl))
    }

    /// With a TTL set, a badge whose expiry overflows is treated as forged.
    pub fn check_fresh(&self, now: DateTime<Utc>, ttl_secs: i64) -> Result<(), BadgeError> {
        if ttl_secs <= 0 {
            return Ok(());
        }
        let expiry = self.expires_at(ttl_secs).ok_or(BadgeError::Malformed)?;
        if now > expiry {
            return Err(BadgeError::Expired);
        }
        Ok(())
    }
}
