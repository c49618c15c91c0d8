use chrono::Utc;
use secrecy::ExposeSecret;
use tracing::{error, info, warn};
use validator::Validate;

use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::{RegisterRequest, TokenPairResponse};
use payvault_primitives::models::{Credentials, RequestMeta, Role, User};

use crate::app_state::AppState;
use crate::repositories::app_repository::AppRepository;
use crate::repositories::user_repository::UserRepository;
use crate::security::SecurityConfig;
use crate::services::auth_service::store_session;

pub struct RegisterService;

impl RegisterService {
    pub async fn register(
        state: &AppState,
        meta: &RequestMeta,
        payload: RegisterRequest,
    ) -> Result<TokenPairResponse, ApiError> {
        payload.validate()?;

        let mut conn = state.db.get().map_err(|_| {
            error!("auth.register: failed to acquire db connection");
            ApiError::DatabaseConnection("Database unavailable".into())
        })?;

        let app = AppRepository::require(&mut conn, payload.app_id).inspect_err(|_| {
            warn!("auth.register: invalid app id {}", payload.app_id);
        })?;

        let pass_hash = SecurityConfig::hash_password(
            &payload.password,
            state.config.token.password_secret.expose_secret(),
        );

        let user_id = UserRepository::create_email_user(
            &mut conn,
            &payload.email,
            &payload.username,
            &pass_hash,
        )?;

        let user = User {
            id: user_id,
            username: payload.username.clone(),
            first_name: None,
            last_name: None,
            photo_url: None,
            balance: 0,
            reserved_balance: 0,
            app_id: payload.app_id,
            role: Role::User,
            credentials: Credentials::Email {
                email: payload.email.clone(),
                pass_hash,
            },
            created_at: Utc::now(),
        };

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

        info!(user_id = %user.id, app = %app.name, "user registered");

        Ok(pair)
    }
}
