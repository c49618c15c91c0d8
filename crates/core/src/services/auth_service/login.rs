use secrecy::ExposeSecret;
use tracing::{error, info, warn};
use validator::Validate;

use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::{LoginRequest, TokenPairResponse};
use payvault_primitives::models::{RequestMeta, User};

use crate::app_state::AppState;
use crate::repositories::app_repository::AppRepository;
use crate::repositories::session_repository::SessionRepository;
use crate::repositories::user_repository::UserRepository;
use crate::security::SecurityConfig;
use crate::services::auth_service::store_session;

pub struct LoginService;

impl LoginService {
    pub async fn login(
        state: &AppState,
        meta: &RequestMeta,
        payload: LoginRequest,
    ) -> Result<TokenPairResponse, ApiError> {
        payload.validate()?;

        let mut conn = state.db.get().map_err(|_| {
            error!("auth.login: failed to acquire db connection");
            ApiError::DatabaseConnection("Database unavailable".into())
        })?;

        AppRepository::require(&mut conn, payload.app_id).inspect_err(|_| {
            warn!("auth.login: invalid app id {}", payload.app_id);
        })?;

        let user = UserRepository::find_by_username(&mut conn, &payload.username, payload.app_id)?
            .ok_or_else(|| {
                warn!("auth.login: user not found");
                ApiError::NotFound("user not found".into())
            })?;

        Self::verify_password(state, &user, &payload.password)?;

        // rotate this device only: drop the old session before minting
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

        info!(user_id = %user.id, "user logged in");

        Ok(pair)
    }

    fn verify_password(state: &AppState, user: &User, password: &str) -> Result<(), ApiError> {
        // password login only exists for email-credentialed accounts
        let Some(stored_hash) = user.pass_hash() else {
            warn!("auth.login: password login attempted for external account");
            return Err(ApiError::Unauthenticated("invalid credentials".into()));
        };

        let secret = state.config.token.password_secret.expose_secret();
        if !SecurityConfig::verify_password(password, secret, stored_hash) {
            warn!("auth.login: invalid credentials");
            return Err(ApiError::Unauthenticated("invalid credentials".into()));
        }

        Ok(())
    }
}
