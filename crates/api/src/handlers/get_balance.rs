use axum::extract::{Extension, Json, State};
use std::sync::Arc;

use payvault_core::services::user_service::UserService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::wallet_dto::BalanceResponse;
use payvault_primitives::models::AccessTokenData;

#[utoipa::path(
    get,
    path = "/api/wallet/balance",
    responses(
        (status = 200, description = "Balance snapshot", body = BalanceResponse),
        (status = 404, description = "User not found")
    ),
    tag = "Wallet"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AccessTokenData>,
) -> Result<Json<BalanceResponse>, ApiError> {
    UserService::get_balance(&state, &caller).await.map(Json)
}
