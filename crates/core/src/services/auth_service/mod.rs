pub mod devices;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod telegram;

use chrono::Utc;
use tracing::error;

use payvault_primitives::error::ApiError;
use payvault_primitives::models::{RefreshSession, RequestMeta};

use crate::app_state::AppState;
use crate::repositories::session_repository::SessionRepository;

/// Writes the refresh session for a freshly minted pair under the device's
/// (user, fingerprint) key, replacing whatever was there.
pub(crate) async fn store_session(
    state: &AppState,
    meta: &RequestMeta,
    user_id: i64,
    app_id: i32,
    refresh_token: &str,
    refresh_exp: i64,
) -> Result<(), ApiError> {
    let session = RefreshSession {
        user_id,
        app_id,
        fingerprint: meta.fingerprint.clone(),
        refresh_token: refresh_token.to_string(),
        user_agent: meta.user_agent.clone(),
        ip: meta.ip.clone(),
        expires_in: refresh_exp,
        created_at: Utc::now(),
    };

    SessionRepository::save(&state.redis, &session, state.config.token.refresh_ttl)
        .await
        .map_err(|e| {
            error!("auth.session: failed to save refresh session: {}", e);
            ApiError::Internal("failed to store session".into())
        })
}
