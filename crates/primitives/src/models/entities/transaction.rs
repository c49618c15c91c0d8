use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable};
use serde::Serialize;
use uuid::Uuid;

use crate::models::entities::enum_types::{TransactionKind, TransactionStatus};

/// One ledger row. Immutable after insert except for `status`, which carries
/// the reservation state machine (pending -> committed | cancelled | expired).
#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::transactions)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: i64,
    pub app_id: i32,
    pub reservation_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub amount: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    pub reserved_before: i64,
    pub reserved_after: i64,
    pub description: String,
    pub idempotency_key: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Funds still spendable after this row: balance minus outstanding holds.
    pub fn remaining_balance(&self) -> i64 {
        self.balance_after - self.reserved_after
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|deadline| deadline < now)
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::transactions)]
pub struct NewTransaction<'a> {
    pub id: Uuid,
    pub user_id: i64,
    pub app_id: i32,
    pub reservation_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub amount: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    pub reserved_before: i64,
    pub reserved_after: i64,
    pub description: &'a str,
    pub idempotency_key: Option<&'a str>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Presentation conversion out of the smallest monetary unit. Only the
/// service edge calls this; ledger arithmetic stays on integers.
pub fn minor_to_major(minor: i64) -> f64 {
    minor as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry_is_strict() {
        let now = Utc::now();
        let tx = Transaction {
            id: Uuid::new_v4(),
            user_id: 1,
            app_id: 1,
            reservation_id: None,
            kind: TransactionKind::Reserve,
            status: TransactionStatus::Pending,
            amount: 100,
            balance_before: 1000,
            balance_after: 1000,
            reserved_before: 0,
            reserved_after: 100,
            description: String::new(),
            idempotency_key: Some("k".into()),
            expires_at: Some(now - Duration::seconds(1)),
            created_at: now,
        };
        assert!(tx.is_expired(now));
        assert_eq!(tx.remaining_balance(), 900);
    }

    #[test]
    fn minor_units_convert_with_fixed_factor() {
        assert_eq!(minor_to_major(12_345), 123.45);
        assert_eq!(minor_to_major(0), 0.0);
    }
}
