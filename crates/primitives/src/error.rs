use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::r2d2;
use http::StatusCode;
use serde_json::json;
use std::fmt;

/// Failure of the two-phase reservation state machine. Surfaced to callers
/// inside an OK response body (`status=FAILED` + message), never as an HTTP
/// error, so the reservation endpoints keep their wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationError {
    InsufficientFunds,
    NotFound,
    Expired,
    AlreadyCommitted,
    AlreadyInProgress,
    InvalidKind,
    NotPending,
    NotExpired,
}

impl fmt::Display for ReservationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ReservationError::InsufficientFunds => "insufficient funds",
            ReservationError::NotFound => "reservation not found",
            ReservationError::Expired => "reservation expired or closed",
            ReservationError::AlreadyCommitted => "reservation already committed",
            ReservationError::AlreadyInProgress => "operation already in progress",
            ReservationError::InvalidKind => "invalid transaction type",
            ReservationError::NotPending => "reservation is not pending",
            ReservationError::NotExpired => "reservation has not expired yet",
        };
        write!(f, "{}", msg)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Validation(validator::ValidationErrors),
    InvalidInput(String),
    Unauthenticated(String),
    PermissionDenied(String),
    NotFound(String),
    Conflict(String),
    RateLimited,
    Reservation(ReservationError),
    Database(diesel::result::Error),
    DatabaseConnection(String),
    Cache(String),
    Token(String),
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(e) => write!(f, "Validation error: {}", e),
            ApiError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
            ApiError::Unauthenticated(e) => write!(f, "Authentication error: {}", e),
            ApiError::PermissionDenied(e) => write!(f, "Permission denied: {}", e),
            ApiError::NotFound(e) => write!(f, "Not found: {}", e),
            ApiError::Conflict(e) => write!(f, "Conflict: {}", e),
            ApiError::RateLimited => write!(f, "Too many requests"),
            ApiError::Reservation(e) => write!(f, "Reservation error: {}", e),
            ApiError::Database(e) => write!(f, "Database error: {}", e),
            ApiError::DatabaseConnection(e) => write!(f, "Database connection error: {}", e),
            ApiError::Cache(e) => write!(f, "Cache error: {}", e),
            ApiError::Token(e) => write!(f, "Token error: {}", e),
            ApiError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Database(e) => Some(e),
            ApiError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> Self {
        ApiError::DatabaseConnection(err.to_string())
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(err: diesel::result::Error) -> Self {
        ApiError::Database(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err)
    }
}

impl From<redis::RedisError> for ApiError {
    fn from(err: redis::RedisError) -> Self {
        ApiError::Cache(err.to_string())
    }
}

impl From<bb8::RunError<redis::RedisError>> for ApiError {
    fn from(err: bb8::RunError<redis::RedisError>) -> Self {
        ApiError::Cache(err.to_string())
    }
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        ApiError::Reservation(err)
    }
}

// Wire mapping. Storage/internal failure text never reaches the client.
impl From<ApiError> for (StatusCode, String) {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                format!("Validation error: {}", errors),
            ),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::PermissionDenied(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests from your IP".to_string(),
            ),
            ApiError::Reservation(e) => match e {
                ReservationError::NotFound => (StatusCode::NOT_FOUND, e.to_string()),
                ReservationError::AlreadyCommitted | ReservationError::AlreadyInProgress => {
                    (StatusCode::CONFLICT, e.to_string())
                }
                _ => (StatusCode::BAD_REQUEST, e.to_string()),
            },
            ApiError::Database(_)
            | ApiError::DatabaseConnection(_)
            | ApiError::Cache(_)
            | ApiError::Token(_)
            | ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message): (StatusCode, String) = self.into();
        (status, Json(json!({ "error": message }))).into_response()
    }
}
