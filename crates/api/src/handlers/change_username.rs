use axum::extract::{Extension, Json, State};
use std::sync::Arc;

use payvault_core::services::user_service::UserService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::user_dto::{ChangeUsernameRequest, ChangeUsernameResponse};
use payvault_primitives::models::AccessTokenData;

#[utoipa::path(
    put,
    path = "/api/user/username",
    request_body = ChangeUsernameRequest,
    responses(
        (status = 200, description = "Username updated", body = ChangeUsernameResponse),
        (status = 409, description = "Username already taken")
    ),
    tag = "User"
)]
pub async fn change_username(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AccessTokenData>,
    Json(payload): Json<ChangeUsernameRequest>,
) -> Result<Json<ChangeUsernameResponse>, ApiError> {
    let username = UserService::change_username(&state, &caller, payload).await?;
    Ok(Json(ChangeUsernameResponse { username }))
}
