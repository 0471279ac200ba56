//! Settings API handlers

use axum::{extract::State, Extension, Json};

use super::dto::{SettingsDto, UpdateSettingsRequest};
use crate::application::SettingsService;
use crate::interfaces::http::common::{ApiResponse, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct SettingsState {
    pub settings: SettingsService,
}

#[utoipa::path(
    get,
    path = "/api/v1/settings",
    tag = "Settings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Effective settings", body = ApiResponse<SettingsDto>)
    )
)]
pub async fn get_settings(State(state): State<SettingsState>) -> ApiResult<SettingsDto> {
    let settings = state.settings.current().await?;
    Ok(Json(ApiResponse::success(settings.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/settings",
    tag = "Settings",
    security(("bearer_auth" = [])),
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Settings after the update", body = ApiResponse<SettingsDto>),
        (status = 403, description = "Administrator role required"),
        (status = 422, description = "Unknown key or invalid value; nothing was written")
    )
)]
pub async fn update_settings(
    State(state): State<SettingsState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<UpdateSettingsRequest>,
) -> ApiResult<SettingsDto> {
    user.require_admin()?;
    let settings = state.settings.update(body.changes(), &user.email).await?;
    Ok(Json(ApiResponse::success(settings.into())))
}
