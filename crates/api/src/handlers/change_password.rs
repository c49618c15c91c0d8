use axum::extract::{Extension, Json, State};
use std::sync::Arc;

use payvault_core::services::user_service::UserService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::SuccessResponse;
use payvault_primitives::models::dtos::user_dto::ChangePasswordRequest;
use payvault_primitives::models::AccessTokenData;

#[utoipa::path(
    put,
    path = "/api/user/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = SuccessResponse),
        (status = 401, description = "Current password is incorrect")
    ),
    tag = "User"
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AccessTokenData>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    UserService::change_password(&state, &caller, payload).await?;
    Ok(Json(SuccessResponse { success: true }))
}
