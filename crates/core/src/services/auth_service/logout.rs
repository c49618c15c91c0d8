use tracing::{info, warn};

use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::LogoutRequest;
use payvault_primitives::models::RequestMeta;

use crate::app_state::AppState;
use crate::repositories::session_repository::SessionRepository;
use crate::security::SecurityConfig;

pub struct LogoutService;

impl LogoutService {
    /// Drops the session for the calling device. The access token must still
    /// be well-formed and unexpired; deleting an absent session still counts
    /// as success.
    pub async fn logout(
        state: &AppState,
        meta: &RequestMeta,
        payload: LogoutRequest,
    ) -> Result<bool, ApiError> {
        let data = SecurityConfig::parse_access_token(&state.keys, &payload.access_token)
            .inspect_err(|_| {
                warn!("auth.logout: access token rejected");
            })?;

        SessionRepository::delete(&state.redis, data.user_id, &meta.fingerprint).await?;

        info!(user_id = %data.user_id, "user logged out");

        Ok(true)
    }
}
