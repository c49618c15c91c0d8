use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use payvault_primitives::error::{ApiError, ReservationError};
use payvault_primitives::models::{NewTransaction, Transaction, TransactionKind, TransactionStatus};
use payvault_primitives::schema::{transactions, users};

use crate::repositories::is_unique_violation;

/// Ledger description written by the reaper; auto-cancels carry no caller key.
pub const EXPIRED_CANCEL_DESCRIPTION: &str = "auto-cancelled: reservation expired";

pub struct TransactionRepository;

impl TransactionRepository {
    /// Places a hold: bumps `reserved_balance` under the availability
    /// predicate and writes the RESERVE row, one database transaction.
    /// A replayed idempotency key returns the original row unchanged.
    pub fn reserve(
        conn: &mut PgConnection,
        user_id: i64,
        app_id: i32,
        amount: i64,
        idempotency_key: &str,
        description: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Transaction, ApiError> {
        let result = conn.transaction::<Transaction, ApiError, _>(|conn| {
            let updated = diesel::update(
                users::table
                    .filter(users::id.eq(user_id))
                    .filter((users::balance - users::reserved_balance).ge(amount)),
            )
            .set((
                users::reserved_balance.eq(users::reserved_balance + amount),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .returning((users::balance, users::reserved_balance))
            .get_result::<(i64, i64)>(conn)
            .optional()?;

            let (balance, reserved_after) = match updated {
                Some(snapshot) => snapshot,
                None => {
                    let exists: bool = diesel::select(diesel::dsl::exists(
                        users::table.filter(users::id.eq(user_id)),
                    ))
                    .get_result(conn)?;
                    if !exists {
                        return Err(ApiError::NotFound("user not found".into()));
                    }
                    return Err(ApiError::Reservation(ReservationError::InsufficientFunds));
                }
            };

            let id = Uuid::new_v4();
            let row = diesel::insert_into(transactions::table)
                .values(NewTransaction {
                    id,
                    user_id,
                    app_id,
                    // RESERVE rows self-reference; terminal children point here
                    reservation_id: Some(id),
                    kind: TransactionKind::Reserve,
                    status: TransactionStatus::Pending,
                    amount,
                    balance_before: balance,
                    balance_after: balance,
                    reserved_before: reserved_after - amount,
                    reserved_after,
                    description,
                    idempotency_key: Some(idempotency_key),
                    expires_at: Some(expires_at),
                })
                .get_result::<Transaction>(conn)?;

            Ok(row)
        });

        match result {
            Err(ApiError::Database(ref e)) if is_unique_violation(e) => {
                // idempotent replay: the hold was rolled back, return the
                // row the original call created
                Self::find_by_idempotency_key(conn, idempotency_key)?
                    .ok_or(ApiError::Reservation(ReservationError::NotFound))
            }
            other => other,
        }
    }

    /// Debits the hold: both `balance` and `reserved_balance` drop by the
    /// reserved amount, the RESERVE flips to `committed`, and a COMMIT child
    /// is written. Serialized per reservation by the row lock.
    pub fn commit(
        conn: &mut PgConnection,
        reservation_id: Uuid,
        commit_idempotency_key: &str,
    ) -> Result<Transaction, ApiError> {
        let result = conn.transaction::<Transaction, ApiError, _>(|conn| {
            let reservation = Self::lock_reservation(conn, reservation_id)?;

            match reservation.status {
                TransactionStatus::Committed => {
                    return Self::find_terminal_child(conn, reservation_id, TransactionKind::Commit)?
                        .ok_or_else(|| {
                            ApiError::Internal(format!(
                                "committed reservation {} has no commit row",
                                reservation_id
                            ))
                        });
                }
                TransactionStatus::Cancelled | TransactionStatus::Expired => {
                    return Err(ApiError::Reservation(ReservationError::Expired));
                }
                TransactionStatus::Pending => {}
                _ => return Err(ApiError::Reservation(ReservationError::InvalidKind)),
            }

            if reservation.is_expired(Utc::now()) {
                return Err(ApiError::Reservation(ReservationError::Expired));
            }

            let updated = diesel::update(
                users::table
                    .filter(users::id.eq(reservation.user_id))
                    .filter(users::balance.ge(reservation.amount))
                    .filter(users::reserved_balance.ge(reservation.amount)),
            )
            .set((
                users::balance.eq(users::balance - reservation.amount),
                users::reserved_balance.eq(users::reserved_balance - reservation.amount),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .returning((users::balance, users::reserved_balance))
            .get_result::<(i64, i64)>(conn)
            .optional()?;

            // a pending reservation guarantees covered funds; a miss here
            // means the ledger invariant is already broken
            let (balance_after, reserved_after) = updated.ok_or_else(|| {
                ApiError::Internal(format!(
                    "balance invariant violated for user {}",
                    reservation.user_id
                ))
            })?;

            diesel::update(transactions::table.find(reservation_id))
                .set(transactions::status.eq(TransactionStatus::Committed))
                .execute(conn)?;

            let child = diesel::insert_into(transactions::table)
                .values(NewTransaction {
                    id: Uuid::new_v4(),
                    user_id: reservation.user_id,
                    app_id: reservation.app_id,
                    reservation_id: Some(reservation_id),
                    kind: TransactionKind::Commit,
                    status: TransactionStatus::Success,
                    amount: reservation.amount,
                    balance_before: balance_after + reservation.amount,
                    balance_after,
                    reserved_before: reserved_after + reservation.amount,
                    reserved_after,
                    description: "commit reservation",
                    idempotency_key: Some(commit_idempotency_key),
                    expires_at: None,
                })
                .get_result::<Transaction>(conn)?;

            Ok(child)
        });

        match result {
            Err(ApiError::Database(ref e)) if is_unique_violation(e) => {
                Self::find_by_idempotency_key(conn, commit_idempotency_key)?
                    .ok_or(ApiError::Reservation(ReservationError::NotFound))
            }
            other => other,
        }
    }

    /// Releases the hold: only `reserved_balance` drops, funds return to
    /// available. Cancelling an already-committed reservation is refused.
    pub fn cancel(
        conn: &mut PgConnection,
        reservation_id: Uuid,
        cancel_idempotency_key: &str,
    ) -> Result<Transaction, ApiError> {
        let result = conn.transaction::<Transaction, ApiError, _>(|conn| {
            let reservation = Self::lock_reservation(conn, reservation_id)?;

            match reservation.status {
                TransactionStatus::Committed => {
                    return Err(ApiError::Reservation(ReservationError::AlreadyCommitted));
                }
                TransactionStatus::Cancelled | TransactionStatus::Expired => {
                    // cancelled by a client or by the reaper; replay returns
                    // the recorded cancel, or a synthetic shape for reaper
                    // cancels that predate this call
                    return match Self::find_terminal_child(
                        conn,
                        reservation_id,
                        TransactionKind::Cancel,
                    )? {
                        Some(child) => Ok(child),
                        None => Ok(Self::synthetic_cancel(&reservation)),
                    };
                }
                TransactionStatus::Pending => {}
                _ => return Err(ApiError::Reservation(ReservationError::InvalidKind)),
            }

            let (balance_after, reserved_after) =
                Self::release_hold(conn, reservation.user_id, reservation.amount)?;

            diesel::update(transactions::table.find(reservation_id))
                .set(transactions::status.eq(TransactionStatus::Cancelled))
                .execute(conn)?;

            let child = diesel::insert_into(transactions::table)
                .values(NewTransaction {
                    id: Uuid::new_v4(),
                    user_id: reservation.user_id,
                    app_id: reservation.app_id,
                    reservation_id: Some(reservation_id),
                    kind: TransactionKind::Cancel,
                    status: TransactionStatus::Success,
                    amount: reservation.amount,
                    balance_before: balance_after,
                    balance_after,
                    reserved_before: reserved_after + reservation.amount,
                    reserved_after,
                    description: "cancel reservation",
                    idempotency_key: Some(cancel_idempotency_key),
                    expires_at: None,
                })
                .get_result::<Transaction>(conn)?;

            Ok(child)
        });

        match result {
            Err(ApiError::Database(ref e)) if is_unique_violation(e) => {
                Self::find_by_idempotency_key(conn, cancel_idempotency_key)?
                    .ok_or(ApiError::Reservation(ReservationError::NotFound))
            }
            other => other,
        }
    }

    /// Reaper-only cancel: requires a pending RESERVE whose deadline has
    /// passed. The RESERVE flips to `expired` and the CANCEL child carries
    /// the fixed auto-cancel description and no idempotency key.
    pub fn cancel_expired(
        conn: &mut PgConnection,
        reservation_id: Uuid,
    ) -> Result<Transaction, ApiError> {
        conn.transaction::<Transaction, ApiError, _>(|conn| {
            let reservation = Self::lock_reservation(conn, reservation_id)?;

            if reservation.status != TransactionStatus::Pending {
                return Err(ApiError::Reservation(ReservationError::NotPending));
            }
            if !reservation.is_expired(Utc::now()) {
                return Err(ApiError::Reservation(ReservationError::NotExpired));
            }

            let (balance_after, reserved_after) =
                Self::release_hold(conn, reservation.user_id, reservation.amount)?;

            diesel::update(transactions::table.find(reservation_id))
                .set(transactions::status.eq(TransactionStatus::Expired))
                .execute(conn)?;

            let child = diesel::insert_into(transactions::table)
                .values(NewTransaction {
                    id: Uuid::new_v4(),
                    user_id: reservation.user_id,
                    app_id: reservation.app_id,
                    reservation_id: Some(reservation_id),
                    kind: TransactionKind::Cancel,
                    status: TransactionStatus::Success,
                    amount: reservation.amount,
                    balance_before: balance_after,
                    balance_after,
                    reserved_before: reserved_after + reservation.amount,
                    reserved_after,
                    description: EXPIRED_CANCEL_DESCRIPTION,
                    idempotency_key: None,
                    expires_at: None,
                })
                .get_result::<Transaction>(conn)?;

            Ok(child)
        })
    }

    /// Pending RESERVE rows past their deadline, oldest deadline first.
    pub fn list_expired(conn: &mut PgConnection, limit: i64) -> Result<Vec<Uuid>, ApiError> {
        transactions::table
            .filter(transactions::kind.eq(TransactionKind::Reserve))
            .filter(transactions::status.eq(TransactionStatus::Pending))
            .filter(transactions::expires_at.lt(Some(Utc::now())))
            .order(transactions::expires_at.asc())
            .limit(limit)
            .select(transactions::id)
            .load::<Uuid>(conn)
            .map_err(ApiError::from)
    }

    pub fn find_by_idempotency_key(
        conn: &mut PgConnection,
        idempotency_key: &str,
    ) -> Result<Option<Transaction>, ApiError> {
        transactions::table
            .filter(transactions::idempotency_key.eq(idempotency_key))
            .first::<Transaction>(conn)
            .optional()
            .map_err(ApiError::from)
    }

    pub fn find_reservation(
        conn: &mut PgConnection,
        reservation_id: Uuid,
    ) -> Result<Option<Transaction>, ApiError> {
        transactions::table
            .find(reservation_id)
            .filter(transactions::kind.eq(TransactionKind::Reserve))
            .first::<Transaction>(conn)
            .optional()
            .map_err(ApiError::from)
    }

    /// User's ledger window, newest first, plus the overall count.
    pub fn list_by_user(
        conn: &mut PgConnection,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Transaction>, i64), ApiError> {
        let rows = transactions::table
            .filter(transactions::user_id.eq(user_id))
            .order(transactions::created_at.desc())
            .limit(limit)
            .offset(offset)
            .load::<Transaction>(conn)?;

        let total = transactions::table
            .filter(transactions::user_id.eq(user_id))
            .count()
            .get_result::<i64>(conn)?;

        Ok((rows, total))
    }

    fn lock_reservation(
        conn: &mut PgConnection,
        reservation_id: Uuid,
    ) -> Result<Transaction, ApiError> {
        let row = transactions::table
            .find(reservation_id)
            .for_update()
            .first::<Transaction>(conn)
            .optional()?
            .ok_or(ApiError::Reservation(ReservationError::NotFound))?;

        if row.kind != TransactionKind::Reserve {
            return Err(ApiError::Reservation(ReservationError::InvalidKind));
        }
        Ok(row)
    }

    fn find_terminal_child(
        conn: &mut PgConnection,
        reservation_id: Uuid,
        kind: TransactionKind,
    ) -> Result<Option<Transaction>, ApiError> {
        transactions::table
            .filter(transactions::reservation_id.eq(reservation_id))
            .filter(transactions::kind.eq(kind))
            .first::<Transaction>(conn)
            .optional()
            .map_err(ApiError::from)
    }

    fn release_hold(
        conn: &mut PgConnection,
        user_id: i64,
        amount: i64,
    ) -> Result<(i64, i64), ApiError> {
        diesel::update(
            users::table
                .filter(users::id.eq(user_id))
                .filter(users::reserved_balance.ge(amount)),
        )
        .set((
            users::reserved_balance.eq(users::reserved_balance - amount),
            users::updated_at.eq(diesel::dsl::now),
        ))
        .returning((users::balance, users::reserved_balance))
        .get_result::<(i64, i64)>(conn)
        .optional()?
        .ok_or_else(|| {
            ApiError::Internal(format!("balance invariant violated for user {}", user_id))
        })
    }

    fn synthetic_cancel(reservation: &Transaction) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: reservation.user_id,
            app_id: reservation.app_id,
            reservation_id: Some(reservation.id),
            kind: TransactionKind::Cancel,
            status: TransactionStatus::Success,
            amount: reservation.amount,
            balance_before: reservation.balance_after,
            balance_after: reservation.balance_after,
            reserved_before: reservation.reserved_after,
            reserved_after: reservation.reserved_after - reservation.amount,
            description: EXPIRED_CANCEL_DESCRIPTION.to_string(),
            idempotency_key: None,
            expires_at: None,
            created_at: Utc::now(),
        }
    }
}
