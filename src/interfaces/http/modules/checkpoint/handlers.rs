//! Checkpoint API handlers
//!
//! The logged-in user is the authorizer of every attempt. Role checks for
//! the chosen input mode happen inside `CheckpointService`, so a rejected
//! attempt still reports its error code and reset scope.

use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use super::dto::{GeofenceCheckDto, GeofenceProbeRequest, RegisterRequestDto, RegistrationResponse};
use crate::application::CheckpointService;
use crate::domain::GeoPoint;
use crate::interfaces::http::common::{ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct CheckpointState {
    pub service: Arc<CheckpointService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/checkpoint/register",
    tag = "Checkpoint",
    security(("bearer_auth" = [])),
    request_body = RegisterRequestDto,
    responses(
        (status = 200, description = "Attempt accepted (or cargo input required)", body = ApiResponse<RegistrationResponse>),
        (status = 400, description = "Invalid coordinates"),
        (status = 401, description = "PIN rejected"),
        (status = 403, description = "Outside the geofence or role not permitted"),
        (status = 404, description = "Identifier did not resolve to a worker or fleet"),
        (status = 409, description = "Already inside, or no open entry to close"),
        (status = 422, description = "Badge invalid or expired, subject inactive")
    )
)]
pub async fn register(
    State(state): State<CheckpointState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(body): ValidatedJson<RegisterRequestDto>,
) -> ApiResult<RegistrationResponse> {
    let receipt = state
        .service
        .register(&user.worker_id, body.into_request())
        .await?;
    Ok(Json(ApiResponse::success(receipt.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/checkpoint/geofence",
    tag = "Checkpoint",
    security(("bearer_auth" = [])),
    request_body = GeofenceProbeRequest,
    responses(
        (status = 200, description = "Distance to the site origin", body = ApiResponse<GeofenceCheckDto>),
        (status = 400, description = "Invalid coordinates")
    )
)]
pub async fn probe_geofence(
    State(state): State<CheckpointState>,
    Json(body): Json<GeofenceProbeRequest>,
) -> ApiResult<GeofenceCheckDto> {
    let check = state
        .service
        .measure(GeoPoint::new(body.latitude, body.longitude))
        .await?;
    Ok(Json(ApiResponse::success(check.into())))
}
