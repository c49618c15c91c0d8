use chrono::Utc;
use tracing::{error, info, warn};

use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::{TelegramLoginRequest, TokenPairResponse};
use payvault_primitives::models::{Credentials, RequestMeta, Role, User};

use crate::app_state::AppState;
use crate::repositories::app_repository::AppRepository;
use crate::repositories::session_repository::SessionRepository;
use crate::repositories::user_repository::UserRepository;
use crate::security::SecurityConfig;
use crate::services::auth_service::store_session;

pub struct TelegramService;

impl TelegramService {
    /// External-IdP login: upsert keyed by the Telegram id. The payload's
    /// HMAC has already been verified at the edge; this only handles
    /// identity and session work.
    pub async fn login_telegram(
        state: &AppState,
        meta: &RequestMeta,
        payload: TelegramLoginRequest,
    ) -> Result<TokenPairResponse, ApiError> {
        let mut conn = state.db.get().map_err(|_| {
            error!("auth.telegram: failed to acquire db connection");
            ApiError::DatabaseConnection("Database unavailable".into())
        })?;

        AppRepository::require(&mut conn, payload.app_id).inspect_err(|_| {
            warn!("auth.telegram: invalid app id {}", payload.app_id);
        })?;

        let existing =
            UserRepository::find_by_telegram_id(&mut conn, payload.telegram_id, payload.app_id)?;

        let user = match existing {
            Some(user) => {
                // known account: refresh the mutable profile fields, but a
                // failed refresh must not abort the login
                if let Err(e) = UserRepository::update_telegram_profile(
                    &mut conn,
                    payload.telegram_id,
                    &payload.username,
                    payload.first_name.as_deref(),
                    payload.last_name.as_deref(),
                    payload.photo_url.as_deref(),
                ) {
                    warn!("auth.telegram: profile refresh failed: {}", e);
                }
                user
            }
            None => {
                info!(telegram_id = %payload.telegram_id, "registering telegram user");
                Self::register(&mut conn, &payload)?
            }
        };

        SessionRepository::delete(&state.redis, user.id, &meta.fingerprint).await?;

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

        info!(user_id = %user.id, "telegram user logged in");

        Ok(pair)
    }

    fn register(
        conn: &mut diesel::PgConnection,
        payload: &TelegramLoginRequest,
    ) -> Result<User, ApiError> {
        let user_id = UserRepository::create_telegram_user(
            conn,
            payload.telegram_id,
            &payload.username,
            payload.first_name.as_deref(),
            payload.last_name.as_deref(),
            payload.photo_url.as_deref(),
        )?;

        UserRepository::assign_role(conn, user_id, payload.app_id, Role::User)?;

        Ok(User {
            id: user_id,
            username: payload.username.clone(),
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
            photo_url: payload.photo_url.clone(),
            balance: 0,
            reserved_balance: 0,
            app_id: payload.app_id,
            role: Role::User,
            credentials: Credentials::Telegram {
                telegram_id: payload.telegram_id,
            },
            created_at: Utc::now(),
        })
    }
}
