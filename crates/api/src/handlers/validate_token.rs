use axum::extract::{Extension, Json, State};
use std::sync::Arc;

use payvault_core::services::user_service::UserService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::user_dto::ValidateTokenResponse;
use payvault_primitives::models::AccessTokenData;

#[utoipa::path(
    get,
    path = "/api/user/validate",
    responses(
        (status = 200, description = "Caller profile", body = ValidateTokenResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User no longer exists")
    ),
    tag = "User"
)]
pub async fn validate_token(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AccessTokenData>,
) -> Result<Json<ValidateTokenResponse>, ApiError> {
    UserService::validate_token(&state, &caller).await.map(Json)
}
