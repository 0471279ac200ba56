//! Shared HTTP types: response envelope, pagination, error mapping

pub mod validated_json;

pub use validated_json::ValidatedJson;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::CheckpointError;
use crate::domain::DomainError;
use crate::shared::{PageRequest, PaginatedResult};

/// Standard JSON envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable rejection code (checkpoint endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Input segment the client should clear before retrying
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
            reset: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            code: None,
            reset: None,
        }
    }
}

/// Paginated list envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn from_result<U>(result: PaginatedResult<U>, f: impl FnMut(U) -> T) -> Self {
        let result = result.map(f);
        Self {
            success: true,
            items: result.items,
            total: result.total,
            page: result.page,
            limit: result.limit,
            total_pages: result.total_pages,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, IntoParams, ToSchema)]
pub struct PaginationParams {
    /// Page number, starting at 1
    pub page: Option<u64>,
    /// Items per page (1-100)
    pub limit: Option<u64>,
}

impl PaginationParams {
    pub fn page_request(&self) -> PageRequest {
        let (page, limit) = crate::shared::validate_pagination(self.page, self.limit);
        PageRequest { page, limit }
    }
}

// ── Errors ──────────────────────────────────────────────────────

/// Error half of every handler result
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiResponse<()>,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiResponse::error(message),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        let status = match &e {
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

/// HTTP status for a registration rejection
pub fn checkpoint_status(e: &CheckpointError) -> StatusCode {
    use CheckpointError::*;
    match e {
        GeofenceViolation { .. } => StatusCode::FORBIDDEN,
        InvalidCoordinates => StatusCode::BAD_REQUEST,
        EntityNotFound(_) => StatusCode::NOT_FOUND,
        AmbiguousIdentifier(_) | InvalidBadge | BadgeExpired | WorkerInactive
        | WorkerMissingDocument | FleetInactive | InvalidCargo => StatusCode::UNPROCESSABLE_ENTITY,
        SubjectPinRequired(_) | SubjectPinMismatch(_) | AuthorizerNotFound
        | AuthorizerPinMismatch => StatusCode::UNAUTHORIZED,
        AuthorizerInactive | InsufficientRole(_) => StatusCode::FORBIDDEN,
        DuplicateEntry | NoActiveEntry => StatusCode::CONFLICT,
        Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<CheckpointError> for ApiError {
    fn from(e: CheckpointError) -> Self {
        let reset = serde_json::to_value(e.reset_scope())
            .ok()
            .and_then(|v| v.as_str().map(String::from));
        Self {
            status: checkpoint_status(&e),
            body: ApiResponse {
                success: false,
                data: None,
                error: Some(e.to_string()),
                code: Some(e.code().to_string()),
                reset,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_rejection_carries_code_and_reset() {
        let err = ApiError::from(CheckpointError::AuthorizerPinMismatch);
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.body.code.as_deref(), Some("AUTHORIZER_PIN_MISMATCH"));
        assert_eq!(err.body.reset.as_deref(), Some("authorizer_pin"));
        assert_eq!(err.body.error.as_deref(), Some("PIN INCORRECTO"));
    }

    #[test]
    fn state_and_geofence_statuses() {
        assert_eq!(checkpoint_status(&CheckpointError::DuplicateEntry), StatusCode::CONFLICT);
        assert_eq!(
            checkpoint_status(&CheckpointError::GeofenceViolation {
                distance_m: 300.0,
                radius_m: 100.0
            }),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        let e = ApiError::from(DomainError::not_found("Worker", "id", "w-1"));
        assert_eq!(e.status, StatusCode::NOT_FOUND);
        let e = ApiError::from(DomainError::Conflict("dup".into()));
        assert_eq!(e.status, StatusCode::CONFLICT);
    }

    #[test]
    fn envelope_omits_empty_fields() {
        let json = serde_json::to_value(ApiResponse::success(1)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": 1}));
    }
}
