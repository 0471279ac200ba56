//! Attendance session domain entity

use chrono::{DateTime, Utc};

use super::hours::elapsed_hours;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Finished,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Finished => "finished",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttendanceSession {
    pub id: String,
    pub worker_id: String,
    pub entry_at: DateTime<Utc>,
    pub exit_at: Option<DateTime<Utc>>,
    pub hours_worked: Option<f64>,
    /// Audit string of the operator who co-signed the entry
    pub entry_signature: String,
    pub exit_signature: Option<String>,
    pub status: SessionStatus,
}

impl AttendanceSession {
    pub fn open(worker_id: impl Into<String>, entry_at: DateTime<Utc>, signature: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            worker_id: worker_id.into(),
            entry_at,
            exit_at: None,
            hours_worked: None,
            entry_signature: signature.into(),
            exit_signature: None,
            status: SessionStatus::Active,
        }
    }

    pub fn is_open(&self) -> bool {
        self.exit_at.is_none()
    }

    pub fn close(&mut self, exit_at: DateTime<Utc>, signature: impl Into<String>) {
        self.exit_at = Some(exit_at);
        self.hours_worked = Some(elapsed_hours(self.entry_at, exit_at));
        self.exit_signature = Some(signature.into());
        self.status = SessionStatus::Finished;
    }

    /// Hours elapsed so far for an open session
    pub fn running_hours(&self, now: DateTime<Utc>) -> f64 {
        elapsed_hours(self.entry_at, self.exit_at.unwrap_or(now))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub worker_id: Option<String>,
    pub status: Option<SessionStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl SessionFilter {
    pub fn matches(&self, s: &AttendanceSession) -> bool {
        if let Some(ref id) = self.worker_id {
            if &s.worker_id != id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if s.status != status {
                return false;
            }
        }
        if let Some(from) = self.from {
            if s.entry_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if s.entry_at > to {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn open_then_close() {
        let entry = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let exit = Utc.with_ymd_and_hms(2024, 1, 10, 17, 0, 0).unwrap();
        let mut s = AttendanceSession::open("w-1", entry, "Admin (admin)");
        assert!(s.is_open());
        assert_eq!(s.status, SessionStatus::Active);

        s.close(exit, "Supervisor (supervisor)");
        assert!(!s.is_open());
        assert_eq!(s.status, SessionStatus::Finished);
        assert_eq!(s.hours_worked, Some(8.0));
        assert_eq!(s.exit_signature.as_deref(), Some("Supervisor (supervisor)"));
    }

    #[test]
    fn running_hours_uses_now_while_open() {
        let entry = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 30, 0).unwrap();
        let s = AttendanceSession::open("w-1", entry, "sig");
        assert_eq!(s.running_hours(now), 3.5);
    }

    #[test]
    fn status_roundtrip_through_text() {
        assert_eq!(SessionStatus::parse("ACTIVE"), Some(SessionStatus::Active));
        assert_eq!(SessionStatus::parse(SessionStatus::Finished.as_str()), Some(SessionStatus::Finished));
        assert_eq!(SessionStatus::parse("closed"), None);
    }
}
