use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use redis::AsyncCommands;
use std::sync::Arc;
use tracing::{error, warn};

use payvault_primitives::error::ApiError;
use payvault_primitives::models::RequestMeta;

use crate::app_state::AppState;

/// Per-IP failed-login accounting over the cache: a rolling attempt counter
/// and a temporary block flag. The token bucket on the login route is a
/// separate layer; this enforces the attempt budget and the one-hour block.
pub struct RateLimiter;

impl RateLimiter {
    fn attempts_key(ip: &str) -> String {
        format!("auth_attempts:{}", ip)
    }

    fn block_key(ip: &str) -> String {
        format!("blocked_user:{}", ip)
    }

    pub async fn is_blocked(state: &AppState, ip: &str) -> Result<bool, ApiError> {
        let mut conn = state.redis.get().await?;
        let flag: Option<String> = conn.get(Self::block_key(ip)).await?;
        Ok(flag.is_some())
    }

    /// Bumps the attempt counter inside its window. Crossing `max_attempts`
    /// blocks the IP for the configured block time and fails the request.
    pub async fn check_and_increment(state: &AppState, ip: &str) -> Result<(), ApiError> {
        let key = Self::attempts_key(ip);
        let mut conn = state.redis.get().await?;

        let attempts: Option<i64> = conn.get(&key).await?;
        let attempts = attempts.unwrap_or(0) + 1;

        if attempts >= state.config.rate_limit.max_attempts {
            Self::block(state, ip).await?;
            warn!(ip = %ip, "login attempts exhausted, blocking ip");
            return Err(ApiError::RateLimited);
        }

        let _: () = conn
            .set_ex(
                &key,
                attempts,
                state.config.rate_limit.attempts_window.as_secs(),
            )
            .await?;

        Ok(())
    }

    pub async fn block(state: &AppState, ip: &str) -> Result<(), ApiError> {
        let mut conn = state.redis.get().await?;
        let _: () = conn
            .set_ex(
                Self::block_key(ip),
                "blocked",
                state.config.rate_limit.block_time.as_secs(),
            )
            .await?;
        Ok(())
    }

    pub async fn reset(state: &AppState, ip: &str) -> Result<(), ApiError> {
        let mut conn = state.redis.get().await?;
        let _: () = conn.del(Self::attempts_key(ip)).await?;
        Ok(())
    }
}

/// Middleware for the rate-limited method set. Blocked IPs are refused
/// outright; everyone else pays one attempt, refunded in full by a
/// successful handler return.
pub async fn login_rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let meta = req
        .extensions()
        .get::<RequestMeta>()
        .cloned()
        .ok_or_else(|| {
            error!("rate_limit: request meta missing from extensions");
            ApiError::Internal("request metadata unavailable".into()).into_response()
        })?;

    if RateLimiter::is_blocked(&state, &meta.ip)
        .await
        .map_err(|e| e.into_response())?
    {
        return Err(ApiError::RateLimited.into_response());
    }

    RateLimiter::check_and_increment(&state, &meta.ip)
        .await
        .map_err(|e| e.into_response())?;

    let response = next.run(req).await;

    if response.status().is_success() {
        if let Err(e) = RateLimiter::reset(&state, &meta.ip).await {
            error!("rate_limit: failed to reset attempts counter: {}", e);
        }
    }

    Ok(response)
}
