use subtle::ConstantTimeEq;
use tracing::{error, info, warn};

use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::{RefreshRequest, TokenPairResponse};
use payvault_primitives::models::RequestMeta;

use crate::app_state::AppState;
use crate::repositories::session_repository::SessionRepository;
use crate::repositories::user_repository::UserRepository;
use crate::security::SecurityConfig;
use crate::services::auth_service::store_session;

pub struct RefreshService;

impl RefreshService {
    /// Rotation-on-refresh: the session is looked up by the *device*
    /// fingerprint, the presented token must match the stored one, and both
    /// tokens are re-minted with the stored session replaced.
    pub async fn refresh(
        state: &AppState,
        meta: &RequestMeta,
        payload: RefreshRequest,
    ) -> Result<TokenPairResponse, ApiError> {
        let session = SessionRepository::find_by_fingerprint(&state.redis, &meta.fingerprint)
            .await
            .map_err(|e| match e {
                ApiError::NotFound(_) => {
                    warn!("auth.refresh: no session for fingerprint");
                    ApiError::Unauthenticated("invalid refresh token".into())
                }
                other => other,
            })?;

        let presented = payload.refresh_token.as_bytes();
        if session.refresh_token.as_bytes().ct_eq(presented).unwrap_u8() == 0 {
            // a mismatched token invalidates the session outright
            warn!("auth.refresh: refresh token mismatch, dropping session");
            SessionRepository::delete(&state.redis, session.user_id, &meta.fingerprint).await?;
            return Err(ApiError::Unauthenticated("invalid refresh token".into()));
        }

        let mut conn = state.db.get().map_err(|_| {
            error!("auth.refresh: failed to acquire db connection");
            ApiError::DatabaseConnection("Database unavailable".into())
        })?;

        let user = UserRepository::find_by_id(&mut conn, session.user_id, session.app_id)?
            .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

        let (pair, refresh_exp) = SecurityConfig::create_token_pair(state, &user)?;
        store_session(
            state,
            meta,
            user.id,
            user.app_id,
            &pair.refresh_token,
            refresh_exp,
        )
        .await?;

        info!(user_id = %user.id, "token pair refreshed");

        Ok(pair)
    }
}
