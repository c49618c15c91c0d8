use axum::extract::{Extension, Json, State};
use std::sync::Arc;

use payvault_core::services::auth_service::logout::LogoutService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::{LogoutRequest, SuccessResponse};
use payvault_primitives::models::RequestMeta;

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Session dropped", body = SuccessResponse),
        (status = 401, description = "Invalid access token")
    ),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(meta): Extension<RequestMeta>,
    Json(payload): Json<LogoutRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let success = LogoutService::logout(&state, &meta, payload).await?;
    Ok(Json(SuccessResponse { success }))
}
