//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use super::dto::{ChangePasswordRequest, LoginRequest, LoginResponse, OperatorInfo};
use crate::application::IdentityService;
use crate::interfaces::http::common::{ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub identity: Arc<IdentityService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials or no console access")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let result = state.identity.login(&request.login, &request.password).await?;
    Ok(Json(ApiResponse::success(LoginResponse {
        token: result.token,
        token_type: result.token_type,
        expires_in: result.expires_in,
        operator: OperatorInfo::from(result.worker),
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current operator", body = ApiResponse<OperatorInfo>),
        (status = 401, description = "Not authenticated or account disabled")
    )
)]
pub async fn get_current_user(
    State(state): State<AuthHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<OperatorInfo> {
    let worker = state.identity.me(&user.worker_id).await?;
    Ok(Json(ApiResponse::success(OperatorInfo::from(worker))))
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/change-password",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Current password is wrong"),
        (status = 422, description = "New password too short")
    )
)]
pub async fn change_password(
    State(state): State<AuthHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<String> {
    state
        .identity
        .change_password(&user.worker_id, &request.current_password, &request.new_password)
        .await?;
    Ok(Json(ApiResponse::success("Password changed".to_string())))
}
