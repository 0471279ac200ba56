//! Registration attempt input

use serde::{Deserialize, Serialize};

use crate::domain::{GeoPoint, WorkerRole};

/// How the subject identifier was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Typed document id or email; subject confirms with their own PIN
    Manual,
    /// Handheld QR scanner
    Scanner,
    /// Device camera reading the QR badge
    Camera,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Scanner => "scanner",
            Self::Camera => "camera",
        }
    }

    pub fn requires_subject_pin(&self) -> bool {
        matches!(self, Self::Manual)
    }

    /// Identifier is a badge payload rather than free text
    pub fn reads_badge(&self) -> bool {
        !self.requires_subject_pin()
    }

    /// Roles allowed to co-sign in this mode
    pub fn permits(&self, role: WorkerRole) -> bool {
        match self {
            Self::Manual => role == WorkerRole::Admin,
            Self::Scanner | Self::Camera => {
                matches!(role, WorkerRole::Supervisor | WorkerRole::Admin)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Entry,
    Exit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
        }
    }
}

/// Data collected when a fleet is dispatched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoDeclaration {
    pub cargo_quantity: Option<i32>,
    pub observation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub mode: InputMode,
    pub direction: Direction,
    pub identifier: String,
    pub subject_pin: Option<String>,
    pub authorizer_pin: String,
    /// Operator device position
    pub position: GeoPoint,
    pub cargo: Option<CargoDeclaration>,
}
