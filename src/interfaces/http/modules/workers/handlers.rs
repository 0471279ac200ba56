//! Worker management API handlers
//!
//! Admin-only endpoints delegating to `WorkerDirectory`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    CreateWorkerRequest, ListWorkersParams, SetPasswordRequest, SetPinRequest,
    UpdateWorkerRequest, WorkerDto,
};
use crate::application::WorkerDirectory;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, ApiResult, PaginatedResponse, PaginationParams, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct WorkerHandlerState {
    pub directory: Arc<WorkerDirectory>,
}

#[utoipa::path(
    get,
    path = "/api/v1/workers",
    tag = "Workers",
    security(("bearer_auth" = [])),
    params(ListWorkersParams),
    responses(
        (status = 200, description = "Worker list", body = PaginatedResponse<WorkerDto>),
        (status = 403, description = "Administrator role required")
    )
)]
pub async fn list_workers(
    State(state): State<WorkerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<ListWorkersParams>,
) -> Result<Json<PaginatedResponse<WorkerDto>>, ApiError> {
    user.require_admin()?;
    let page = PaginationParams {
        page: params.page,
        limit: params.limit,
    }
    .page_request();
    let result = state.directory.list(params.filter()?, page).await?;
    Ok(Json(PaginatedResponse::from_result(result, WorkerDto::from)))
}

#[utoipa::path(
    get,
    path = "/api/v1/workers/{id}",
    tag = "Workers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Worker ID")),
    responses(
        (status = 200, description = "Worker details", body = ApiResponse<WorkerDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_worker(
    State(state): State<WorkerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<WorkerDto> {
    user.require_self_or_admin(&id)?;
    let worker = state.directory.get(&id).await?;
    Ok(Json(ApiResponse::success(worker.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/workers",
    tag = "Workers",
    security(("bearer_auth" = [])),
    request_body = CreateWorkerRequest,
    responses(
        (status = 201, description = "Worker created", body = ApiResponse<WorkerDto>),
        (status = 409, description = "Email or document id already registered"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_worker(
    State(state): State<WorkerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateWorkerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WorkerDto>>), ApiError> {
    user.require_admin()?;
    let worker = state.directory.create(request.into_new_worker()?).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(worker.into()))))
}

#[utoipa::path(
    put,
    path = "/api/v1/workers/{id}",
    tag = "Workers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Worker ID")),
    request_body = UpdateWorkerRequest,
    responses(
        (status = 200, description = "Worker updated", body = ApiResponse<WorkerDto>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Duplicate email/document, or worker is on site")
    )
)]
pub async fn update_worker(
    State(state): State<WorkerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateWorkerRequest>,
) -> ApiResult<WorkerDto> {
    user.require_admin()?;
    let worker = state.directory.update(&id, request.into_update()?).await?;
    Ok(Json(ApiResponse::success(worker.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/workers/{id}/pin",
    tag = "Workers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Worker ID")),
    request_body = SetPinRequest,
    responses(
        (status = 200, description = "PIN replaced"),
        (status = 422, description = "PIN must be 4-8 digits")
    )
)]
pub async fn set_worker_pin(
    State(state): State<WorkerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<SetPinRequest>,
) -> ApiResult<String> {
    user.require_admin()?;
    state.directory.set_pin(&id, &request.pin).await?;
    Ok(Json(ApiResponse::success("PIN updated".to_string())))
}

#[utoipa::path(
    put,
    path = "/api/v1/workers/{id}/password",
    tag = "Workers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Worker ID")),
    request_body = SetPasswordRequest,
    responses(
        (status = 200, description = "Console access updated")
    )
)]
pub async fn set_worker_password(
    State(state): State<WorkerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<SetPasswordRequest>,
) -> ApiResult<String> {
    user.require_admin()?;
    state
        .directory
        .set_password(&id, request.password.as_deref())
        .await?;
    let message = if request.password.is_some() {
        "Console access enabled"
    } else {
        "Console access revoked"
    };
    Ok(Json(ApiResponse::success(message.to_string())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/workers/{id}",
    tag = "Workers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Worker ID")),
    responses(
        (status = 200, description = "Worker deactivated", body = ApiResponse<WorkerDto>),
        (status = 409, description = "Worker is on site")
    )
)]
pub async fn deactivate_worker(
    State(state): State<WorkerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<WorkerDto> {
    user.require_admin()?;
    if id == user.worker_id {
        return Err(ApiError::bad_request("You cannot deactivate your own account"));
    }
    let worker = state.directory.deactivate(&id).await?;
    Ok(Json(ApiResponse::success(worker.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/workers/{id}/reactivate",
    tag = "Workers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Worker ID")),
    responses(
        (status = 200, description = "Worker reactivated", body = ApiResponse<WorkerDto>)
    )
)]
pub async fn reactivate_worker(
    State(state): State<WorkerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<WorkerDto> {
    user.require_admin()?;
    let worker = state.directory.reactivate(&id).await?;
    Ok(Json(ApiResponse::success(worker.into())))
}
