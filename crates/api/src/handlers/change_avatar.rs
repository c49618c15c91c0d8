use axum::extract::{Extension, Json, State};
use std::sync::Arc;

use payvault_core::services::user_service::UserService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::SuccessResponse;
use payvault_primitives::models::dtos::user_dto::ChangeAvatarRequest;
use payvault_primitives::models::AccessTokenData;

#[utoipa::path(
    put,
    path = "/api/user/avatar",
    request_body = ChangeAvatarRequest,
    responses(
        (status = 200, description = "Avatar updated", body = SuccessResponse),
        (status = 400, description = "Invalid photo URL")
    ),
    tag = "User"
)]
pub async fn change_avatar(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AccessTokenData>,
    Json(payload): Json<ChangeAvatarRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    UserService::change_avatar(&state, &caller, payload).await?;
    Ok(Json(SuccessResponse { success: true }))
}
