//! Fleet profile API handlers (admin only)

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    CreateFleetProfileRequest, FleetProfileDto, ListFleetProfilesParams,
    UpdateFleetProfileRequest,
};
use crate::application::FleetDirectory;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, ApiResult, PaginatedResponse, PaginationParams, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::workers::SetPinRequest;

#[derive(Clone)]
pub struct FleetHandlerState {
    pub directory: Arc<FleetDirectory>,
}

#[utoipa::path(
    get,
    path = "/api/v1/fleet-profiles",
    tag = "Fleet Profiles",
    security(("bearer_auth" = [])),
    params(ListFleetProfilesParams),
    responses(
        (status = 200, description = "Fleet profile list", body = PaginatedResponse<FleetProfileDto>)
    )
)]
pub async fn list_fleet_profiles(
    State(state): State<FleetHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<ListFleetProfilesParams>,
) -> Result<Json<PaginatedResponse<FleetProfileDto>>, ApiError> {
    user.require_admin()?;
    let page = PaginationParams {
        page: params.page,
        limit: params.limit,
    }
    .page_request();
    let result = state.directory.list(params.filter(), page).await?;
    Ok(Json(PaginatedResponse::from_result(result, FleetProfileDto::from)))
}

#[utoipa::path(
    get,
    path = "/api/v1/fleet-profiles/{id}",
    tag = "Fleet Profiles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Fleet profile ID")),
    responses(
        (status = 200, description = "Fleet profile", body = ApiResponse<FleetProfileDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_fleet_profile(
    State(state): State<FleetHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<FleetProfileDto> {
    user.require_admin()?;
    let profile = state.directory.get(&id).await?;
    Ok(Json(ApiResponse::success(profile.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/fleet-profiles",
    tag = "Fleet Profiles",
    security(("bearer_auth" = [])),
    request_body = CreateFleetProfileRequest,
    responses(
        (status = 201, description = "Fleet profile created", body = ApiResponse<FleetProfileDto>),
        (status = 409, description = "Document id already registered")
    )
)]
pub async fn create_fleet_profile(
    State(state): State<FleetHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateFleetProfileRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FleetProfileDto>>), ApiError> {
    user.require_admin()?;
    let profile = state.directory.create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(profile.into()))))
}

#[utoipa::path(
    put,
    path = "/api/v1/fleet-profiles/{id}",
    tag = "Fleet Profiles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Fleet profile ID")),
    request_body = UpdateFleetProfileRequest,
    responses(
        (status = 200, description = "Fleet profile updated", body = ApiResponse<FleetProfileDto>),
        (status = 409, description = "Fleet is on site")
    )
)]
pub async fn update_fleet_profile(
    State(state): State<FleetHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateFleetProfileRequest>,
) -> ApiResult<FleetProfileDto> {
    user.require_admin()?;
    let profile = state.directory.update(&id, request.into()).await?;
    Ok(Json(ApiResponse::success(profile.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/fleet-profiles/{id}/pin",
    tag = "Fleet Profiles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Fleet profile ID")),
    request_body = SetPinRequest,
    responses(
        (status = 200, description = "Secret PIN replaced")
    )
)]
pub async fn set_fleet_pin(
    State(state): State<FleetHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<SetPinRequest>,
) -> ApiResult<String> {
    user.require_admin()?;
    state.directory.set_pin(&id, &request.pin).await?;
    Ok(Json(ApiResponse::success("PIN updated".to_string())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/fleet-profiles/{id}",
    tag = "Fleet Profiles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Fleet profile ID")),
    responses(
        (status = 200, description = "Fleet profile deactivated", body = ApiResponse<FleetProfileDto>),
        (status = 409, description = "Fleet is on site")
    )
)]
pub async fn deactivate_fleet_profile(
    State(state): State<FleetHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<FleetProfileDto> {
    user.require_admin()?;
    let profile = state.directory.deactivate(&id).await?;
    Ok(Json(ApiResponse::success(profile.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/fleet-profiles/{id}/reactivate",
    tag = "Fleet Profiles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Fleet profile ID")),
    responses(
        (status = 200, description = "Fleet profile reactivated", body = ApiResponse<FleetProfileDto>)
    )
)]
pub async fn reactivate_fleet_profile(
    State(state): State<FleetHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<FleetProfileDto> {
    user.require_admin()?;
    let profile = state.directory.reactivate(&id).await?;
    Ok(Json(ApiResponse::success(profile.into())))
}
