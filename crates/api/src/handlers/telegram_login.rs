use axum::extract::{Extension, Json, State};
use secrecy::ExposeSecret;
use std::sync::Arc;

use payvault_core::security::SecurityConfig;
use payvault_core::services::auth_service::telegram::TelegramService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::{TelegramLoginRequest, TokenPairResponse};
use payvault_primitives::models::RequestMeta;

#[utoipa::path(
    post,
    path = "/api/auth/telegram",
    request_body = TelegramLoginRequest,
    responses(
        (status = 200, description = "Telegram login successful", body = TokenPairResponse),
        (status = 401, description = "Telegram payload rejected")
    ),
    tag = "Auth"
)]
pub async fn telegram_login(
    State(state): State<Arc<AppState>>,
    Extension(meta): Extension<RequestMeta>,
    Json(payload): Json<TelegramLoginRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    // the identity is only trusted past this point
    SecurityConfig::verify_telegram_login(
        &payload,
        state.config.telegram.bot_token.expose_secret(),
    )?;

    TelegramService::login_telegram(&state, &meta, payload)
        .await
        .map(Json)
}
