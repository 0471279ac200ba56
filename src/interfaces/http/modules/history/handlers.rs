//! History API handlers
//!
//! Supervisors and admins see everything; a plain worker only sees their
//! own attendance sessions.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use super::dto::{
    AttendanceSessionDto, FleetAccessQueryParams, FleetAccessRecordDto, OnSiteSummaryDto,
    SessionQueryParams,
};
use crate::application::HistoryService;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, ApiResult, PaginatedResponse, PaginationParams,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct HistoryState {
    pub history: Arc<HistoryService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/attendance/sessions",
    tag = "History",
    security(("bearer_auth" = [])),
    params(SessionQueryParams),
    responses(
        (status = 200, description = "Attendance sessions, newest first", body = PaginatedResponse<AttendanceSessionDto>)
    )
)]
pub async fn list_sessions(
    State(state): State<HistoryState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<SessionQueryParams>,
) -> Result<Json<PaginatedResponse<AttendanceSessionDto>>, ApiError> {
    let mut filter = params.filter()?;
    if !user.is_operator() {
        filter.worker_id = Some(user.worker_id.clone());
    }
    let page = PaginationParams {
        page: params.page,
        limit: params.limit,
    }
    .page_request();
    let result = state.history.sessions(filter, page).await?;
    Ok(Json(PaginatedResponse::from_result(result, AttendanceSessionDto::from)))
}

#[utoipa::path(
    get,
    path = "/api/v1/attendance/on-site",
    tag = "History",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Who is inside right now", body = ApiResponse<OnSiteSummaryDto>),
        (status = 403, description = "Supervisor or administrator role required")
    )
)]
pub async fn on_site_summary(
    State(state): State<HistoryState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<OnSiteSummaryDto> {
    user.require_operator()?;
    let summary = state.history.on_site().await?;
    Ok(Json(ApiResponse::success(summary.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/fleet-access",
    tag = "History",
    security(("bearer_auth" = [])),
    params(FleetAccessQueryParams),
    responses(
        (status = 200, description = "Fleet access records, newest first", body = PaginatedResponse<FleetAccessRecordDto>),
        (status = 403, description = "Supervisor or administrator role required")
    )
)]
pub async fn list_fleet_access(
    State(state): State<HistoryState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<FleetAccessQueryParams>,
) -> Result<Json<PaginatedResponse<FleetAccessRecordDto>>, ApiError> {
    user.require_operator()?;
    let page = PaginationParams {
        page: params.page,
        limit: params.limit,
    }
    .page_request();
    let result = state.history.fleet_access(params.filter()?, page).await?;
    Ok(Json(PaginatedResponse::from_result(result, FleetAccessRecordDto::from)))
}
