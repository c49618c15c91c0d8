use chrono::{DateTime, Utc};

use crate::models::entities::enum_types::{TransactionKind, TransactionStatus};

/// Advisory operation-state record in the TTL cache, keyed by idempotency
/// key. The ledger's unique index is the source of truth; this only
/// short-circuits retries and flags in-flight work.
#[derive(Debug, Clone)]
pub struct IdempotencyRecord {
    pub key: String,
    pub status: TransactionStatus,
    pub operation: TransactionKind,
    pub user_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}
