use secrecy::ExposeSecret;
use tracing::{error, info, warn};
use validator::Validate;

use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::user_dto::{
    AssignRoleRequest, ChangeAvatarRequest, ChangeEmailRequest, ChangePasswordRequest,
    ChangeUsernameRequest, ValidateTokenResponse,
};
use payvault_primitives::models::dtos::wallet_dto::BalanceResponse;
use payvault_primitives::models::{minor_to_major, AccessTokenData, Role, User};

use crate::app_state::AppState;
use crate::repositories::user_repository::UserRepository;
use crate::security::SecurityConfig;

pub struct UserService;

impl UserService {
    /// Profile + balance snapshot for the verified caller.
    pub async fn validate_token(
        state: &AppState,
        caller: &AccessTokenData,
    ) -> Result<ValidateTokenResponse, ApiError> {
        let user = Self::load_caller(state, caller)?;

        Ok(ValidateTokenResponse {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email().map(str::to_string),
            photo_url: user.photo_url.clone(),
            role: user.role.as_wire(),
            app_id: user.app_id,
            balance: minor_to_major(user.balance),
        })
    }

    pub async fn assign_role(
        state: &AppState,
        caller: &AccessTokenData,
        payload: AssignRoleRequest,
    ) -> Result<(), ApiError> {
        payload.validate()?;

        if caller.role != Role::Admin {
            warn!(caller = %caller.user_id, "user.assign_role: non-admin caller");
            return Err(ApiError::PermissionDenied("admin role required".into()));
        }

        let role = Role::from_wire(payload.role)?;

        let mut conn = state.db.get().map_err(|_| {
            error!("user.assign_role: failed to acquire db connection");
            ApiError::DatabaseConnection("Database unavailable".into())
        })?;

        UserRepository::assign_role(&mut conn, payload.user_id, payload.app_id, role)?;

        info!(
            user_id = %payload.user_id,
            app_id = %payload.app_id,
            role = %role,
            "role assigned"
        );

        Ok(())
    }

    pub async fn change_avatar(
        state: &AppState,
        caller: &AccessTokenData,
        payload: ChangeAvatarRequest,
    ) -> Result<(), ApiError> {
        payload.validate()?;

        let mut conn = state.db.get().map_err(|_| {
            error!("user.change_avatar: failed to acquire db connection");
            ApiError::DatabaseConnection("Database unavailable".into())
        })?;

        UserRepository::change_photo(&mut conn, caller.user_id, &payload.photo_url)?;

        info!(user_id = %caller.user_id, "avatar changed");
        Ok(())
    }

    pub async fn change_username(
        state: &AppState,
        caller: &AccessTokenData,
        payload: ChangeUsernameRequest,
    ) -> Result<String, ApiError> {
        payload.validate()?;

        let mut conn = state.db.get().map_err(|_| {
            error!("user.change_username: failed to acquire db connection");
            ApiError::DatabaseConnection("Database unavailable".into())
        })?;

        UserRepository::change_username(&mut conn, caller.user_id, &payload.username)?;

        info!(user_id = %caller.user_id, "username changed");
        Ok(payload.username)
    }

    pub async fn change_email(
        state: &AppState,
        caller: &AccessTokenData,
        payload: ChangeEmailRequest,
    ) -> Result<String, ApiError> {
        payload.validate()?;

        let mut conn = state.db.get().map_err(|_| {
            error!("user.change_email: failed to acquire db connection");
            ApiError::DatabaseConnection("Database unavailable".into())
        })?;

        UserRepository::change_email(&mut conn, caller.user_id, &payload.email)?;

        info!(user_id = %caller.user_id, "email changed");
        Ok(payload.email)
    }

    pub async fn change_password(
        state: &AppState,
        caller: &AccessTokenData,
        payload: ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        payload.validate()?;

        let user = Self::load_caller(state, caller)?;

        let secret = state.config.token.password_secret.expose_secret();

        // external accounts have no password to change
        let Some(stored_hash) = user.pass_hash() else {
            warn!(user_id = %user.id, "user.change_password: external account");
            return Err(ApiError::Unauthenticated("current password is incorrect".into()));
        };

        if !SecurityConfig::verify_password(&payload.current_password, secret, stored_hash) {
            warn!(user_id = %user.id, "user.change_password: wrong current password");
            return Err(ApiError::Unauthenticated("current password is incorrect".into()));
        }

        let new_hash = SecurityConfig::hash_password(&payload.new_password, secret);

        let mut conn = state.db.get().map_err(|_| {
            error!("user.change_password: failed to acquire db connection");
            ApiError::DatabaseConnection("Database unavailable".into())
        })?;

        UserRepository::change_password(&mut conn, user.id, &new_hash)?;

        info!(user_id = %user.id, "password changed");
        Ok(())
    }

    /// Balance triple in presentation units; the only spot where wallet
    /// numbers leave the smallest-unit domain.
    pub async fn get_balance(
        state: &AppState,
        caller: &AccessTokenData,
    ) -> Result<BalanceResponse, ApiError> {
        let user = Self::load_caller(state, caller)?;

        Ok(BalanceResponse {
            balance: minor_to_major(user.balance),
            reserved_balance: minor_to_major(user.reserved_balance),
            available_balance: minor_to_major(user.available_balance()),
        })
    }

    fn load_caller(state: &AppState, caller: &AccessTokenData) -> Result<User, ApiError> {
        let mut conn = state.db.get().map_err(|_| {
            error!("user.load: failed to acquire db connection");
            ApiError::DatabaseConnection("Database unavailable".into())
        })?;

        UserRepository::find_by_id(&mut conn, caller.user_id, caller.app_id)?
            .ok_or_else(|| ApiError::NotFound("user not found".into()))
    }
}
