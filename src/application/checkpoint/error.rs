//! Registration rejections
//!
//! Every rejection carries a stable code, a user-facing message and the
//! narrowest input segment the client should clear before retrying.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{DomainError, SubjectKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Geofence,
    Resolution,
    Authorization,
    State,
    Persistence,
}

/// Input segment to clear on the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetScope {
    None,
    SubjectPin,
    AuthorizerPin,
    Subject,
    Cargo,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckpointError {
    #[error("FUERA DEL ÁREA PERMITIDA: {distance_m:.0} m (máximo {radius_m:.0} m)")]
    GeofenceViolation { distance_m: f64, radius_m: f64 },

    #[error("COORDENADAS GPS INVÁLIDAS")]
    InvalidCoordinates,

    #[error("NO SE ENCONTRÓ NINGÚN REGISTRO PARA: {0}")]
    EntityNotFound(String),

    #[error("IDENTIFICADOR AMBIGUO: {0} COINCIDENCIAS")]
    AmbiguousIdentifier(usize),

    #[error("CÓDIGO QR INVÁLIDO")]
    InvalidBadge,

    #[error("CÓDIGO QR VENCIDO")]
    BadgeExpired,

    #[error("TRABAJADOR INACTIVO")]
    WorkerInactive,

    #[error("TRABAJADOR SIN DOCUMENTO DE IDENTIDAD")]
    WorkerMissingDocument,

    #[error("PERFIL DE FLOTA INACTIVO")]
    FleetInactive,

    #[error("{}", subject_pin_required_message(.0))]
    SubjectPinRequired(SubjectKind),

    #[error("{}", subject_pin_mismatch_message(.0))]
    SubjectPinMismatch(SubjectKind),

    #[error("AUTORIZADOR NO ENCONTRADO")]
    AuthorizerNotFound,

    #[error("AUTORIZADOR INACTIVO")]
    AuthorizerInactive,

    #[error("PIN INCORRECTO")]
    AuthorizerPinMismatch,

    #[error("ROL NO AUTORIZADO PARA REGISTRAR EN MODO {0}")]
    InsufficientRole(String),

    #[error("YA TIENE UNA ENTRADA ACTIVA")]
    DuplicateEntry,

    #[error("NO TIENE UNA ENTRADA ACTIVA")]
    NoActiveEntry,

    #[error("CANTIDAD DE CARGA INVÁLIDA")]
    InvalidCargo,

    #[error("ERROR AL GUARDAR: {0}")]
    Persistence(String),
}

fn subject_pin_required_message(kind: &SubjectKind) -> &'static str {
    match kind {
        SubjectKind::Worker => "INGRESE EL PIN DEL TRABAJADOR",
        SubjectKind::Fleet => "INGRESE EL PIN SECRETO DE LA FLOTA",
    }
}

fn subject_pin_mismatch_message(kind: &SubjectKind) -> &'static str {
    match kind {
        SubjectKind::Worker => "PIN DEL TRABAJADOR INCORRECTO",
        SubjectKind::Fleet => "PIN SECRETO DE LA FLOTA INCORRECTO",
    }
}

impl CheckpointError {
    pub fn category(&self) -> ErrorCategory {
        use CheckpointError::*;
        match self {
            GeofenceViolation { .. } | InvalidCoordinates => ErrorCategory::Geofence,
            EntityNotFound(_) | AmbiguousIdentifier(_) | InvalidBadge | BadgeExpired
            | WorkerInactive | WorkerMissingDocument | FleetInactive => ErrorCategory::Resolution,
            SubjectPinRequired(_) | SubjectPinMismatch(_) | AuthorizerNotFound
            | AuthorizerInactive | AuthorizerPinMismatch | InsufficientRole(_) => {
                ErrorCategory::Authorization
            }
            DuplicateEntry | NoActiveEntry | InvalidCargo => ErrorCategory::State,
            Persistence(_) => ErrorCategory::Persistence,
        }
    }

    pub fn code(&self) -> &'static str {
        use CheckpointError::*;
        match self {
            GeofenceViolation { .. } => "GEOFENCE_VIOLATION",
            InvalidCoordinates => "INVALID_COORDINATES",
            EntityNotFound(_) => "ENTITY_NOT_FOUND",
            AmbiguousIdentifier(_) => "AMBIGUOUS_IDENTIFIER",
            InvalidBadge => "INVALID_BADGE",
            BadgeExpired => "BADGE_EXPIRED",
            WorkerInactive => "WORKER_INACTIVE",
            WorkerMissingDocument => "WORKER_MISSING_DOCUMENT",
            FleetInactive => "FLEET_INACTIVE",
            SubjectPinRequired(_) => "SUBJECT_PIN_REQUIRED",
            SubjectPinMismatch(_) => "SUBJECT_PIN_MISMATCH",
            AuthorizerNotFound => "AUTHORIZER_NOT_FOUND",
            AuthorizerInactive => "AUTHORIZER_INACTIVE",
            AuthorizerPinMismatch => "AUTHORIZER_PIN_MISMATCH",
            InsufficientRole(_) => "INSUFFICIENT_ROLE",
            DuplicateEntry => "DUPLICATE_ENTRY",
            NoActiveEntry => "NO_ACTIVE_ENTRY",
            InvalidCargo => "INVALID_CARGO",
            Persistence(_) => "PERSISTENCE_FAILURE",
        }
    }

    pub fn reset_scope(&self) -> ResetScope {
        use CheckpointError::*;
        match self {
            GeofenceViolation { .. } | InvalidCoordinates | Persistence(_) => ResetScope::None,
            SubjectPinRequired(_) | SubjectPinMismatch(_) => ResetScope::SubjectPin,
            AuthorizerNotFound | AuthorizerInactive | AuthorizerPinMismatch
            | InsufficientRole(_) => ResetScope::AuthorizerPin,
            InvalidCargo => ResetScope::Cargo,
            EntityNotFound(_) | AmbiguousIdentifier(_) | InvalidBadge | BadgeExpired
            | WorkerInactive | WorkerMissingDocument | FleetInactive | DuplicateEntry
            | NoActiveEntry => ResetScope::Subject,
        }
    }
}

impl From<DomainError> for CheckpointError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Conflict(_) => CheckpointError::DuplicateEntry,
            other => CheckpointError::Persistence(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_messages() {
        assert_eq!(CheckpointError::AuthorizerPinMismatch.to_string(), "PIN INCORRECTO");
        assert_eq!(CheckpointError::DuplicateEntry.to_string(), "YA TIENE UNA ENTRADA ACTIVA");
        assert_eq!(CheckpointError::NoActiveEntry.to_string(), "NO TIENE UNA ENTRADA ACTIVA");
        assert_eq!(
            CheckpointError::GeofenceViolation {
                distance_m: 153.4,
                radius_m: 100.0
            }
            .to_string(),
            "FUERA DEL ÁREA PERMITIDA: 153 m (máximo 100 m)"
        );
        assert_ne!(
            CheckpointError::SubjectPinMismatch(SubjectKind::Worker).to_string(),
            CheckpointError::SubjectPinMismatch(SubjectKind::Fleet).to_string()
        );
    }

    #[test]
    fn pin_failures_reset_only_their_field() {
        assert_eq!(
            CheckpointError::AuthorizerPinMismatch.reset_scope(),
            ResetScope::AuthorizerPin
        );
        assert_eq!(
            CheckpointError::InsufficientRole("manual".into()).reset_scope(),
            ResetScope::AuthorizerPin
        );
        assert_eq!(
            CheckpointError::SubjectPinMismatch(SubjectKind::Fleet).reset_scope(),
            ResetScope::SubjectPin
        );
    }

    #[test]
    fn conflict_maps_to_duplicate_entry() {
        let e: CheckpointError = DomainError::Conflict("open session".into()).into();
        assert_eq!(e, CheckpointError::DuplicateEntry);
        let e: CheckpointError = DomainError::Database("disk full".into()).into();
        assert_eq!(e.category(), ErrorCategory::Persistence);
    }
}
