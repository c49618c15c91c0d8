use tracing::{info, warn};

use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::{DeviceDto, DevicesResponse};
use payvault_primitives::models::{AccessTokenData, Role};

use crate::app_state::AppState;
use crate::repositories::session_repository::SessionRepository;

pub struct DevicesService;

impl DevicesService {
    /// Enumerates a user's live refresh sessions. Admin-gated; sessions the
    /// cache already evicted are simply not listed.
    pub async fn list_devices(
        state: &AppState,
        caller: &AccessTokenData,
        user_id: i64,
    ) -> Result<DevicesResponse, ApiError> {
        if caller.role != Role::Admin {
            warn!(caller = %caller.user_id, "devices.list: non-admin caller");
            return Err(ApiError::PermissionDenied("admin role required".into()));
        }

        let sessions = SessionRepository::list_by_user(&state.redis, user_id).await?;

        info!(user_id = %user_id, count = sessions.len(), "devices listed");

        Ok(DevicesResponse {
            devices: sessions
                .into_iter()
                .map(|s| DeviceDto {
                    fingerprint: s.fingerprint,
                    user_agent: s.user_agent,
                    ip: s.ip,
                    created_at: s.created_at,
                })
                .collect(),
        })
    }
}
