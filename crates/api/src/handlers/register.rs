use axum::extract::{Extension, Json, State};
use std::sync::Arc;

use payvault_core::services::auth_service::register::RegisterService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::{RegisterRequest, TokenPairResponse};
use payvault_primitives::models::RequestMeta;

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = TokenPairResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "User already exists")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Extension(meta): Extension<RequestMeta>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    RegisterService::register(&state, &meta, payload)
        .await
        .map(Json)
}
