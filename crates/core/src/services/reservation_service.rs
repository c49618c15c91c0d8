use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use payvault_primitives::error::{ApiError, ReservationError};
use payvault_primitives::models::dtos::wallet_dto::ReserveRequest;
use payvault_primitives::models::{
    AccessTokenData, IdempotencyRecord, Transaction, TransactionKind, TransactionStatus,
};

use crate::app_state::AppState;
use crate::repositories::idempotency_repository::IdempotencyRepository;
use crate::repositories::transaction_repository::TransactionRepository;

/// Hard cap on the `[from, to)` listing window.
const MAX_LIST_WINDOW: i64 = 10;

/// Orchestrates the cache and the ledger into idempotent two-phase holds.
/// Every write follows the same shape: consult the cache, mark pending, run
/// the database primitive, record the outcome.
pub struct ReservationService;

impl ReservationService {
    pub async fn reserve(
        state: &AppState,
        caller: &AccessTokenData,
        payload: ReserveRequest,
    ) -> Result<Transaction, ApiError> {
        payload.validate()?;
        let key = payload.idempotency_key.clone();

        if let Some(existing) =
            Self::begin(state, &key, TransactionKind::Reserve, caller.user_id, payload.amount)
                .await?
        {
            // replayed key: hand back the original hold unless it has lapsed
            if existing.is_expired(Utc::now()) {
                warn!(key = %key, "replayed reservation has expired");
                IdempotencyRepository::delete(&state.redis, &key).await?;
                return Err(ApiError::Reservation(ReservationError::Expired));
            }
            info!(key = %key, "returning existing reservation");
            return Ok(existing);
        }

        let mut conn = state.db.get().map_err(|_| {
            error!("reservations.reserve: failed to acquire db connection");
            ApiError::DatabaseConnection("Database unavailable".into())
        })?;

        let expires_at = Utc::now()
            + chrono::Duration::from_std(state.config.reservation.reserve_ttl)
                .map_err(|e| ApiError::Internal(format!("invalid reserve ttl: {}", e)))?;

        let result = TransactionRepository::reserve(
            &mut conn,
            caller.user_id,
            payload.app_id,
            payload.amount,
            &key,
            payload.description.as_deref().unwrap_or_default(),
            expires_at,
        );

        match result {
            Ok(tx) if tx.is_expired(Utc::now()) => {
                // the unique key resurfaced an old, lapsed hold; free the
                // cache slot so the caller can retry under a fresh key. The
                // reaper owns the actual cancel.
                warn!(key = %key, reservation_id = %tx.id, "existing reservation expired");
                IdempotencyRepository::delete(&state.redis, &key).await?;
                Err(ApiError::Reservation(ReservationError::Expired))
            }
            Ok(tx) => {
                // stays pending in the cache until a terminal child lands
                info!(
                    reservation_id = %tx.id,
                    amount = %tx.amount,
                    "reserve successful"
                );
                Ok(tx)
            }
            Err(e) => Err(Self::record_failure(state, &key, e).await),
        }
    }

    pub async fn commit(state: &AppState, reservation_id: Uuid) -> Result<Transaction, ApiError> {
        let key = format!("commit:{}", reservation_id);

        if let Some(existing) =
            Self::begin(state, &key, TransactionKind::Commit, 0, 0).await?
        {
            info!(key = %key, "returning existing commit");
            return Ok(existing);
        }

        let mut conn = state.db.get().map_err(|_| {
            error!("reservations.commit: failed to acquire db connection");
            ApiError::DatabaseConnection("Database unavailable".into())
        })?;

        match TransactionRepository::commit(&mut conn, reservation_id, &key) {
            Ok(tx) => {
                Self::record_success(state, &key).await;
                info!(
                    reservation_id = %reservation_id,
                    commit_id = %tx.id,
                    amount = %tx.amount,
                    "commit successful"
                );
                Ok(tx)
            }
            Err(e) => Err(Self::record_failure(state, &key, e).await),
        }
    }

    pub async fn cancel(state: &AppState, reservation_id: Uuid) -> Result<Transaction, ApiError> {
        let key = format!("cancel:{}", reservation_id);

        if let Some(existing) =
            Self::begin(state, &key, TransactionKind::Cancel, 0, 0).await?
        {
            info!(key = %key, "returning existing cancel");
            return Ok(existing);
        }

        let mut conn = state.db.get().map_err(|_| {
            error!("reservations.cancel: failed to acquire db connection");
            ApiError::DatabaseConnection("Database unavailable".into())
        })?;

        match TransactionRepository::cancel(&mut conn, reservation_id, &key) {
            Ok(tx) => {
                Self::record_success(state, &key).await;
                info!(
                    reservation_id = %reservation_id,
                    cancel_id = %tx.id,
                    amount = %tx.amount,
                    "cancel successful"
                );
                Ok(tx)
            }
            Err(e) => Err(Self::record_failure(state, &key, e).await),
        }
    }

    pub async fn list_transactions(
        state: &AppState,
        user_id: i64,
        from: i64,
        to: i64,
    ) -> Result<(Vec<Transaction>, i64), ApiError> {
        let (limit, offset) = Self::validate_window(from, to)?;

        let mut conn = state.db.get().map_err(|_| {
            error!("reservations.list: failed to acquire db connection");
            ApiError::DatabaseConnection("Database unavailable".into())
        })?;

        TransactionRepository::list_by_user(&mut conn, user_id, limit, offset)
    }

    /// Bounded half-open window `[from, to)`; an out-of-range `from` yields
    /// an empty page downstream rather than an error.
    pub fn validate_window(from: i64, to: i64) -> Result<(i64, i64), ApiError> {
        if from < 0 {
            return Err(ApiError::InvalidInput("from must be non-negative".into()));
        }
        if to <= from {
            return Err(ApiError::InvalidInput("to must be greater than from".into()));
        }
        if to - from > MAX_LIST_WINDOW {
            return Err(ApiError::InvalidInput(format!(
                "window must not exceed {} entries",
                MAX_LIST_WINDOW
            )));
        }
        Ok((to - from, from))
    }

    /// The shared preamble: resolve the cached operation state, then claim
    /// the key as pending. `Some(tx)` means the work is already done and the
    /// matching ledger row is the answer.
    async fn begin(
        state: &AppState,
        key: &str,
        operation: TransactionKind,
        user_id: i64,
        amount: i64,
    ) -> Result<Option<Transaction>, ApiError> {
        if let Some(existing) = IdempotencyRepository::get(&state.redis, key).await? {
            match existing.status {
                TransactionStatus::Success => {
                    let mut conn = state.db.get().map_err(|_| {
                        error!("reservations: failed to acquire db connection");
                        ApiError::DatabaseConnection("Database unavailable".into())
                    })?;
                    // cache is advisory; the ledger row is the answer of record
                    let tx = TransactionRepository::find_by_idempotency_key(&mut conn, key)?
                        .ok_or(ApiError::Reservation(ReservationError::NotFound))?;
                    return Ok(Some(tx));
                }
                TransactionStatus::Pending => {
                    info!(key = %key, "operation already in progress");
                    return Err(ApiError::Reservation(ReservationError::AlreadyInProgress));
                }
                _ => {
                    // a failed attempt releases the key for a retry
                    IdempotencyRepository::delete(&state.redis, key).await?;
                }
            }
        }

        let record = IdempotencyRecord {
            key: key.to_string(),
            status: TransactionStatus::Pending,
            operation,
            user_id,
            amount,
            created_at: Utc::now(),
        };
        IdempotencyRepository::put(&state.redis, &record, &state.config.reservation).await?;

        Ok(None)
    }

    async fn record_success(state: &AppState, key: &str) {
        // the ledger write already landed; a cache miss here only costs a
        // future round-trip
        if let Err(e) =
            IdempotencyRepository::set_status(&state.redis, key, TransactionStatus::Success, &state.config.reservation).await
        {
            error!(key = %key, "failed to mark idempotency key success: {}", e);
        }
    }

    async fn record_failure(state: &AppState, key: &str, err: ApiError) -> ApiError {
        if let Err(e) =
            IdempotencyRepository::set_status(&state.redis, key, TransactionStatus::Failed, &state.config.reservation).await
        {
            error!(key = %key, "failed to mark idempotency key failed: {}", e);
        }

        match err {
            domain @ (ApiError::Reservation(_) | ApiError::NotFound(_)) => {
                warn!(key = %key, "reservation operation failed: {}", domain);
                domain
            }
            other => {
                error!(key = %key, "reservation operation failed: {}", other);
                ApiError::Internal("reservation operation failed".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_accepts_bounded_ranges() {
        assert_eq!(ReservationService::validate_window(0, 10).unwrap(), (10, 0));
        assert_eq!(ReservationService::validate_window(5, 6).unwrap(), (1, 5));
        assert_eq!(ReservationService::validate_window(90, 100).unwrap(), (10, 90));
    }

    #[test]
    fn window_rejects_invalid_ranges() {
        assert!(ReservationService::validate_window(-1, 5).is_err());
        assert!(ReservationService::validate_window(5, 5).is_err());
        assert!(ReservationService::validate_window(7, 3).is_err());
        assert!(ReservationService::validate_window(0, 11).is_err());
    }
}
