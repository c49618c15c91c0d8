use axum::extract::{Extension, Json, Query, State};
use std::sync::Arc;

use payvault_core::services::reservation_service::ReservationService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::wallet_dto::{
    TransactionDto, TransactionsQuery, TransactionsResponse,
};
use payvault_primitives::models::AccessTokenData;

#[utoipa::path(
    get,
    path = "/api/wallet/transactions",
    params(TransactionsQuery),
    responses(
        (status = 200, description = "Ledger window, newest first", body = TransactionsResponse),
        (status = 400, description = "Window invalid or wider than 10 entries")
    ),
    tag = "Wallet"
)]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AccessTokenData>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let (rows, total) =
        ReservationService::list_transactions(&state, caller.user_id, query.from, query.to).await?;

    Ok(Json(TransactionsResponse {
        transactions: rows.into_iter().map(TransactionDto::from).collect(),
        total,
        from: query.from,
        to: query.to,
    }))
}
