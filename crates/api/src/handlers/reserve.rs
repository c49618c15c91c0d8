use axum::extract::{Extension, Json, State};
use std::sync::Arc;

use payvault_core::services::reservation_service::ReservationService;
use payvault_core::AppState;
use payvault_primitives::error::{ApiError, ReservationError};
use payvault_primitives::models::dtos::wallet_dto::{ReserveRequest, ReserveResponse};
use payvault_primitives::models::AccessTokenData;

#[utoipa::path(
    post,
    path = "/api/wallet/reserve",
    request_body = ReserveRequest,
    responses(
        (status = 200, description = "Reservation outcome (FAILED rides in the body)", body = ReserveResponse),
        (status = 404, description = "User not found")
    ),
    tag = "Wallet"
)]
pub async fn reserve(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AccessTokenData>,
    Json(payload): Json<ReserveRequest>,
) -> Result<Json<ReserveResponse>, ApiError> {
    match ReservationService::reserve(&state, &caller, payload).await {
        Ok(tx) => Ok(Json(ReserveResponse {
            status: "PENDING".into(),
            reservation_id: tx.reservation_id,
            reserved_amount: tx.amount,
            remaining_balance: tx.remaining_balance(),
            error_message: None,
        })),
        Err(ApiError::Reservation(ReservationError::AlreadyInProgress)) => {
            Ok(Json(ReserveResponse {
                status: "PENDING".into(),
                reservation_id: None,
                reserved_amount: 0,
                remaining_balance: 0,
                error_message: Some(ReservationError::AlreadyInProgress.to_string()),
            }))
        }
        Err(ApiError::Reservation(e)) => Ok(Json(ReserveResponse {
            status: "FAILED".into(),
            reservation_id: None,
            reserved_amount: 0,
            remaining_balance: 0,
            error_message: Some(e.to_string()),
        })),
        Err(other) => Err(other),
    }
}
