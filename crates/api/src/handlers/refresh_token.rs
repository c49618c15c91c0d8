use axum::extract::{Extension, Json, State};
use std::sync::Arc;

use payvault_core::services::auth_service::refresh::RefreshService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::{RefreshRequest, TokenPairResponse};
use payvault_primitives::models::RequestMeta;

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token pair rotated", body = TokenPairResponse),
        (status = 401, description = "Invalid refresh token")
    ),
    tag = "Auth"
)]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Extension(meta): Extension<RequestMeta>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    RefreshService::refresh(&state, &meta, payload).await.map(Json)
}
