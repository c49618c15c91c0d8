use axum::extract::{Extension, Json, State};
use std::sync::Arc;

use payvault_core::services::auth_service::login::LoginService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::{LoginRequest, TokenPairResponse};
use payvault_primitives::models::RequestMeta;

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenPairResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "User not found"),
        (status = 429, description = "Too many attempts from this IP")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Extension(meta): Extension<RequestMeta>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    LoginService::login(&state, &meta, payload).await.map(Json)
}
