//! Worker domain entity

use chrono::{DateTime, Utc};

/// Worker role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerRole {
    Worker,
    Supervisor,
    Admin,
}

impl WorkerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Supervisor => "supervisor",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "worker" => Some(Self::Worker),
            "supervisor" => Some(Self::Supervisor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        *self == Self::Admin
    }
}

impl std::fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Employee with a badge, a PIN and optionally console access
#[derive(Debug, Clone)]
pub struct Worker {
    pub id: String,
    pub full_name: String,
    /// National document number printed on the badge
    pub document_id: Option<String>,
    pub email: String,
    /// bcrypt hash of the security PIN
    pub pin_hash: String,
    /// bcrypt hash of the console password; `None` means no console login
    pub password_hash: Option<String>,
    pub role: WorkerRole,
    pub is_active: bool,
    /// Currently inside the site
    pub on_site: bool,
    pub last_entry_at: Option<DateTime<Utc>>,
    pub last_exit_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Worker {
    pub fn new(
        full_name: impl Into<String>,
        document_id: Option<String>,
        email: impl Into<String>,
        pin_hash: impl Into<String>,
        role: WorkerRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            full_name: full_name.into(),
            document_id,
            email: email.into(),
            pin_hash: pin_hash.into(),
            password_hash: None,
            role,
            is_active: true,
            on_site: false,
            last_entry_at: None,
            last_exit_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Document id present and not blank
    pub fn has_document(&self) -> bool {
        self.document_id
            .as_deref()
            .map(|d| !d.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn mark_entry(&mut self, at: DateTime<Utc>) {
        self.on_site = true;
        self.last_entry_at = Some(at);
        self.updated_at = at;
    }

    pub fn mark_exit(&mut self, at: DateTime<Utc>) {
        self.on_site = false;
        self.last_exit_at = Some(at);
        self.updated_at = at;
    }

    /// Whether the identifier equals this worker's document id or email,
    /// ignoring case.
    pub fn matches_exactly(&self, identifier: &str) -> bool {
        let needle = identifier.trim().to_lowercase();
        self.email.to_lowercase() == needle
            || self
                .document_id
                .as_deref()
                .map(|d| d.to_lowercase() == needle)
                .unwrap_or(false)
    }

    /// Document id equality, ignoring case. Badges carry only a document id.
    pub fn matches_document(&self, document_id: &str) -> bool {
        let needle = document_id.trim().to_lowercase();
        !needle.is_empty()
            && self
                .document_id
                .as_deref()
                .map(|d| d.trim().to_lowercase() == needle)
                .unwrap_or(false)
    }

    /// Case-insensitive substring match on document id or email.
    pub fn matches_partially(&self, identifier: &str) -> bool {
        let needle = identifier.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        self.email.to_lowercase().contains(&needle)
            || self
                .document_id
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }
}

/// Partial update applied by admins
#[derive(Debug, Clone, Default)]
pub struct WorkerUpdate {
    pub full_name: Option<String>,
    pub document_id: Option<String>,
    pub email: Option<String>,
    pub role: Option<WorkerRole>,
    pub is_active: Option<bool>,
}

impl WorkerUpdate {
    pub fn apply(self, worker: &mut Worker) {
        if let Some(name) = self.full_name {
            worker.full_name = name;
        }
        if let Some(doc) = self.document_id {
            let doc = doc.trim().to_string();
            worker.document_id = if doc.is_empty() { None } else { Some(doc) };
        }
        if let Some(email) = self.email {
            worker.email = email;
        }
        if let Some(role) = self.role {
            worker.role = role;
        }
        if let Some(active) = self.is_active {
            worker.is_active = active;
        }
        worker.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkerFilter {
    pub search: Option<String>,
    pub role: Option<WorkerRole>,
    pub is_active: Option<bool>,
    pub on_site: Option<bool>,
}

impl WorkerFilter {
    pub fn matches(&self, worker: &Worker) -> bool {
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            if !worker.full_name.to_lowercase().contains(&needle)
                && !worker.matches_partially(search)
            {
                return false;
            }
        }
        if let Some(role) = self.role {
            if worker.role != role {
                return false;
            }
        }
        if let Some(active) = self.is_active {
            if worker.is_active != active {
                return false;
            }
        }
        if let Some(on_site) = self.on_site {
            if worker.on_site != on_site {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Worker {
        Worker::new(
            "Ana Torres",
            Some("DNI-4455".into()),
            "ana@example.com",
            "hash",
            WorkerRole::Worker,
        )
    }

    #[test]
    fn new_worker_is_active_and_off_site() {
        let w = sample();
        assert!(w.is_active);
        assert!(!w.on_site);
        assert!(w.password_hash.is_none());
        assert!(w.has_document());
    }

    #[test]
    fn blank_document_is_missing() {
        let mut w = sample();
        w.document_id = Some("   ".into());
        assert!(!w.has_document());
        w.document_id = None;
        assert!(!w.has_document());
    }

    #[test]
    fn entry_and_exit_flip_presence() {
        let mut w = sample();
        let t = Utc::now();
        w.mark_entry(t);
        assert!(w.on_site);
        assert_eq!(w.last_entry_at, Some(t));
        w.mark_exit(t);
        assert!(!w.on_site);
        assert_eq!(w.last_exit_at, Some(t));
    }

    #[test]
    fn identifier_matching_ignores_case() {
        let w = sample();
        assert!(w.matches_exactly("dni-4455"));
        assert!(w.matches_exactly("ANA@EXAMPLE.COM"));
        assert!(!w.matches_exactly("4455"));
        assert!(w.matches_document("DNI-4455"));
        assert!(!w.matches_document("ana@example.com"));
        assert!(!w.matches_document("DNI-445"));
        assert!(w.matches_partially("4455"));
        assert!(w.matches_partially("Example"));
        assert!(!w.matches_partially(""));
    }

    #[test]
    fn role_parsing() {
        assert_eq!(WorkerRole::parse("Admin"), Some(WorkerRole::Admin));
        assert_eq!(WorkerRole::parse(" supervisor "), Some(WorkerRole::Supervisor));
        assert_eq!(WorkerRole::parse("guard"), None);
        assert!(WorkerRole::Admin.is_admin());
        assert!(!WorkerRole::Supervisor.is_admin());
    }

    #[test]
    fn update_clears_blank_document() {
        let mut w = sample();
        WorkerUpdate {
            document_id: Some(" ".into()),
            role: Some(WorkerRole::Supervisor),
            ..Default::default()
        }
        .apply(&mut w);
        assert!(w.document_id.is_none());
        assert_eq!(w.role, WorkerRole::Supervisor);
    }
}
