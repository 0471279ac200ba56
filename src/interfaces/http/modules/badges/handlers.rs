//! Badge API handlers
//!
//! Every call stamps a new issue time, so with a non-zero TTL the client
//! simply polls these endpoints to rotate the displayed QR code.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::dto::BadgeDto;
use crate::application::BadgeIssuer;
use crate::interfaces::http::common::{ApiResponse, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct BadgeState {
    pub issuer: Arc<BadgeIssuer>,
}

#[utoipa::path(
    get,
    path = "/api/v1/badges/workers/{id}",
    tag = "Badges",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Worker ID")),
    responses(
        (status = 200, description = "Worker badge", body = ApiResponse<BadgeDto>),
        (status = 403, description = "Only the worker or an administrator"),
        (status = 404, description = "Not found"),
        (status = 422, description = "Worker inactive or without document id")
    )
)]
pub async fn worker_badge(
    State(state): State<BadgeState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<BadgeDto> {
    user.require_self_or_admin(&id)?;
    let badge = state.issuer.for_worker(&id).await?;
    Ok(Json(ApiResponse::success(badge.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/badges/fleet/{id}",
    tag = "Badges",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Fleet profile ID")),
    responses(
        (status = 200, description = "Fleet badge", body = ApiResponse<BadgeDto>),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Not found")
    )
)]
pub async fn fleet_badge(
    State(state): State<BadgeState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<BadgeDto> {
    user.require_admin()?;
    let badge = state.issuer.for_fleet(&id).await?;
    Ok(Json(ApiResponse::success(badge.into())))
}
