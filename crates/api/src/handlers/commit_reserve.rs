use axum::extract::{Extension, Json, State};
use std::sync::Arc;

use payvault_core::services::reservation_service::ReservationService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::wallet_dto::{CommitRequest, CommitResponse};
use payvault_primitives::models::AccessTokenData;

#[utoipa::path(
    post,
    path = "/api/wallet/commit",
    request_body = CommitRequest,
    responses(
        (status = 200, description = "Commit outcome (failure detail rides in the body)", body = CommitResponse)
    ),
    tag = "Wallet"
)]
pub async fn commit_reserve(
    State(state): State<Arc<AppState>>,
    Extension(_caller): Extension<AccessTokenData>,
    Json(payload): Json<CommitRequest>,
) -> Result<Json<CommitResponse>, ApiError> {
    match ReservationService::commit(&state, payload.reservation_id).await {
        Ok(tx) => Ok(Json(CommitResponse {
            success: true,
            committed_amount: tx.amount,
            new_balance: tx.balance_after,
            error_message: None,
        })),
        Err(ApiError::Reservation(e)) => Ok(Json(CommitResponse {
            success: false,
            committed_amount: 0,
            new_balance: 0,
            error_message: Some(e.to_string()),
        })),
        Err(other) => Err(other),
    }
}
