pub mod app_repository;
pub mod idempotency_repository;
pub mod session_repository;
pub mod transaction_repository;
pub mod user_repository;

pub(crate) fn is_unique_violation(err: &diesel::result::Error) -> bool {
    matches!(
        err,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _
        )
    )
}
