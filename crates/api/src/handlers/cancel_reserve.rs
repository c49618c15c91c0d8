use axum::extract::{Extension, Json, State};
use std::sync::Arc;

use payvault_core::services::reservation_service::ReservationService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::wallet_dto::{CancelRequest, CancelResponse};
use payvault_primitives::models::AccessTokenData;

#[utoipa::path(
    post,
    path = "/api/wallet/cancel",
    request_body = CancelRequest,
    responses(
        (status = 200, description = "Cancel outcome (failure detail rides in the body)", body = CancelResponse)
    ),
    tag = "Wallet"
)]
pub async fn cancel_reserve(
    State(state): State<Arc<AppState>>,
    Extension(_caller): Extension<AccessTokenData>,
    Json(payload): Json<CancelRequest>,
) -> Result<Json<CancelResponse>, ApiError> {
    match ReservationService::cancel(&state, payload.reservation_id).await {
        Ok(tx) => Ok(Json(CancelResponse {
            success: true,
            released_amount: tx.amount,
            // funds return to available: balance unchanged, hold released
            new_balance: tx.remaining_balance(),
            error_message: None,
        })),
        Err(ApiError::Reservation(e)) => Ok(Json(CancelResponse {
            success: false,
            released_amount: 0,
            new_balance: 0,
            error_message: Some(e.to_string()),
        })),
        Err(other) => Err(other),
    }
}
