use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use std::collections::HashMap;

use payvault_primitives::error::ApiError;
use payvault_primitives::models::app_state::reservation_info::ReservationInfo;
use payvault_primitives::models::{IdempotencyRecord, TransactionKind, TransactionStatus};

use crate::app_state::RedisPool;

/// Operation-state cache under `transaction:{idempotency_key}`. Advisory
/// only; the ledger's unique key settles every race this cache loses.
pub struct IdempotencyRepository;

impl IdempotencyRepository {
    fn key(idempotency_key: &str) -> String {
        format!("transaction:{}", idempotency_key)
    }

    /// Writes the record as pending with the short TTL, bounding how long a
    /// stuck operation can hold the key.
    pub async fn put(
        redis: &RedisPool,
        record: &IdempotencyRecord,
        cfg: &ReservationInfo,
    ) -> Result<(), ApiError> {
        let key = Self::key(&record.key);
        let fields = [
            ("status", record.status.to_string()),
            ("type", record.operation.to_string()),
            ("user_id", record.user_id.to_string()),
            ("amount", record.amount.to_string()),
            ("created_at", record.created_at.to_rfc3339()),
        ];

        let mut conn = redis.get().await?;
        let _: () = conn.hset_multiple(&key, &fields).await?;
        let _: () = conn
            .expire(&key, cfg.idempotency_pending_ttl.as_secs() as i64)
            .await?;
        Ok(())
    }

    pub async fn get(
        redis: &RedisPool,
        idempotency_key: &str,
    ) -> Result<Option<IdempotencyRecord>, ApiError> {
        let mut conn = redis.get().await?;
        let fields: HashMap<String, String> = conn.hgetall(Self::key(idempotency_key)).await?;
        if fields.is_empty() {
            return Ok(None);
        }

        let get = |name: &str| -> Result<String, ApiError> {
            fields.get(name).cloned().ok_or_else(|| {
                ApiError::Cache(format!(
                    "idempotency field {} missing for key {}",
                    name, idempotency_key
                ))
            })
        };

        let status = TransactionStatus::parse(&get("status")?)?;
        let operation = TransactionKind::parse(&get("type")?)?;
        let user_id = get("user_id")?
            .parse::<i64>()
            .map_err(|e| ApiError::Cache(format!("invalid user_id: {}", e)))?;
        let amount = get("amount")?
            .parse::<i64>()
            .map_err(|e| ApiError::Cache(format!("invalid amount: {}", e)))?;
        let created_at = DateTime::parse_from_rfc3339(&get("created_at")?)
            .map_err(|e| ApiError::Cache(format!("invalid created_at: {}", e)))?
            .with_timezone(&Utc);

        Ok(Some(IdempotencyRecord {
            key: idempotency_key.to_string(),
            status,
            operation,
            user_id,
            amount,
            created_at,
        }))
    }

    /// Flips the state and swaps the TTL: long for success, short for
    /// failed/pending.
    pub async fn set_status(
        redis: &RedisPool,
        idempotency_key: &str,
        status: TransactionStatus,
        cfg: &ReservationInfo,
    ) -> Result<(), ApiError> {
        let key = Self::key(idempotency_key);
        let ttl = match status {
            TransactionStatus::Success => cfg.idempotency_success_ttl,
            TransactionStatus::Failed => cfg.idempotency_failed_ttl,
            _ => cfg.idempotency_pending_ttl,
        };

        let mut conn = redis.get().await?;
        let _: () = conn.hset(&key, "status", status.to_string()).await?;
        let _: () = conn.expire(&key, ttl.as_secs() as i64).await?;
        Ok(())
    }

    pub async fn delete(redis: &RedisPool, idempotency_key: &str) -> Result<(), ApiError> {
        let mut conn = redis.get().await?;
        let _: () = conn.del(Self::key(idempotency_key)).await?;
        Ok(())
    }
}
