//! The two kinds of entity that can pass the checkpoint
//!
//! The resolver produces a [`Subject`] once; everything downstream works
//! through [`AccessSubject`] instead of branching on the kind.

use serde::{Deserialize, Serialize};

use super::fleet::FleetProfile;
use super::worker::Worker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Worker,
    Fleet,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Fleet => "fleet",
        }
    }

    /// Tag used in badge payloads
    pub fn badge_prefix(&self) -> &'static str {
        match self {
            Self::Worker => "P",
            Self::Fleet => "F",
        }
    }

    pub fn from_badge_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "P" => Some(Self::Worker),
            "F" => Some(Self::Fleet),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities the checkpoint needs from a resolved entity
pub trait AccessSubject {
    fn kind(&self) -> SubjectKind;
    fn subject_id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn document_id(&self) -> Option<&str>;
    /// Hash of the PIN the subject types in manual mode
    fn pin_hash(&self) -> &str;
    fn is_active(&self) -> bool;
}

impl AccessSubject for Worker {
    fn kind(&self) -> SubjectKind {
        SubjectKind::Worker
    }

    fn subject_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.full_name
    }

    fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    fn pin_hash(&self) -> &str {
        &self.pin_hash
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl AccessSubject for FleetProfile {
    fn kind(&self) -> SubjectKind {
        SubjectKind::Fleet
    }

    fn subject_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.full_name
    }

    fn document_id(&self) -> Option<&str> {
        Some(&self.document_id)
    }

    fn pin_hash(&self) -> &str {
        &self.secret_pin_hash
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// A resolved checkpoint subject
#[derive(Debug, Clone)]
pub enum Subject {
    Worker(Worker),
    Fleet(FleetProfile),
}

impl Subject {
    fn inner(&self) -> &dyn AccessSubject {
        match self {
            Subject::Worker(w) => w,
            Subject::Fleet(f) => f,
        }
    }
}

impl AccessSubject for Subject {
    fn kind(&self) -> SubjectKind {
        self.inner().kind()
    }

    fn subject_id(&self) -> &str {
        self.inner().subject_id()
    }

    fn display_name(&self) -> &str {
        self.inner().display_name()
    }

    fn document_id(&self) -> Option<&str> {
        self.inner().document_id()
    }

    fn pin_hash(&self) -> &str {
        self.inner().pin_hash()
    }

    fn is_active(&self) -> bool {
        self.inner().is_active()
    }
}
