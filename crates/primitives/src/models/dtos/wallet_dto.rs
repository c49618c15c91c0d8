use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::entities::transaction::Transaction;

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    pub balance: f64,
    pub reserved_balance: f64,
    pub available_balance: f64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReserveRequest {
    #[validate(range(min = 1))]
    pub app_id: i32,
    #[validate(range(min = 1))]
    pub amount: i64,
    #[validate(length(min = 1, max = 255))]
    pub idempotency_key: String,
    pub description: Option<String>,
}

/// Domain failures ride inside an OK body: `status` is `PENDING` or `FAILED`
/// and `error_message` carries the detail.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReserveResponse {
    pub status: String,
    pub reservation_id: Option<Uuid>,
    pub reserved_amount: i64,
    pub remaining_balance: i64,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommitRequest {
    pub reservation_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommitResponse {
    pub success: bool,
    pub committed_amount: i64,
    pub new_balance: i64,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelRequest {
    pub reservation_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CancelResponse {
    pub success: bool,
    pub released_amount: i64,
    pub new_balance: i64,
    pub error_message: Option<String>,
}

/// Half-open window `[from, to)` over the caller's ledger, newest first.
#[derive(Debug, Deserialize, IntoParams)]
pub struct TransactionsQuery {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionDto {
    pub id: Uuid,
    pub kind: String,
    pub status: String,
    pub amount: i64,
    pub description: String,
    pub reservation_id: Option<Uuid>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Transaction> for TransactionDto {
    fn from(tx: Transaction) -> Self {
        TransactionDto {
            id: tx.id,
            kind: tx.kind.to_string(),
            status: tx.status.to_string(),
            amount: tx.amount,
            description: tx.description,
            reservation_id: tx.reservation_id,
            expires_at: tx.expires_at,
            created_at: tx.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionsResponse {
    pub transactions: Vec<TransactionDto>,
    pub total: i64,
    pub from: i64,
    pub to: i64,
}
