use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::extract::State;
use chrono::Utc;
use hmac::{Hmac, Mac};
use http::HeaderMap;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::{TelegramLoginRequest, TokenPairResponse};
use payvault_primitives::models::{AccessTokenData, RefreshTokenData, Role, User};

use crate::app_state::AppState;
use crate::paseto::TokenKeys;

type HmacSha256 = Hmac<Sha256>;

/// Telegram auth payloads older than this are replayable junk.
const TELEGRAM_AUTH_MAX_AGE_SECS: i64 = 24 * 60 * 60;

pub struct SecurityConfig;

impl SecurityConfig {
    /// HMAC-SHA-256 keyed by the process-level secret. Hashes are hex strings
    /// and never leave the storage layer.
    pub fn hash_password(password: &str, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(password.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time comparison via the MAC itself.
    pub fn verify_password(password: &str, secret: &str, stored_hash: &str) -> bool {
        let Ok(stored) = hex::decode(stored_hash) else {
            return false;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(password.as_bytes());
        mac.verify_slice(&stored).is_ok()
    }

    pub fn mint_access_token(
        keys: &TokenKeys,
        user: &User,
        ttl: Duration,
    ) -> Result<String, ApiError> {
        let claims = json!({
            "sub": user.id,
            "app_id": user.app_id,
            "username": user.username,
            "photo_url": user.photo_url,
            "role": user.role.as_wire(),
            "exp": Utc::now().timestamp() + ttl.as_secs() as i64,
        });
        keys.sign(&claims)
    }

    pub fn mint_refresh_token(
        keys: &TokenKeys,
        user_id: i64,
        ttl: Duration,
    ) -> Result<(String, i64), ApiError> {
        let exp = Utc::now().timestamp() + ttl.as_secs() as i64;
        let token = keys.sign(&json!({ "sub": user_id, "exp": exp }))?;
        Ok((token, exp))
    }

    /// Mints the access/refresh pair for a login-shaped operation. Returns the
    /// refresh expiry so the session record can mirror it.
    pub fn create_token_pair(
        state: &AppState,
        user: &User,
    ) -> Result<(TokenPairResponse, i64), ApiError> {
        let access_token =
            Self::mint_access_token(&state.keys, user, state.config.token.access_ttl)?;
        let (refresh_token, refresh_exp) =
            Self::mint_refresh_token(&state.keys, user.id, state.config.token.refresh_ttl)?;

        Ok((
            TokenPairResponse {
                access_token,
                refresh_token,
            },
            refresh_exp,
        ))
    }

    /// Verifies an access token: signature, expiry, and the presence and type
    /// of every access claim. Failures are indistinguishable on the wire.
    pub fn parse_access_token(keys: &TokenKeys, token: &str) -> Result<AccessTokenData, ApiError> {
        let invalid = || ApiError::Unauthenticated("invalid token".into());

        let claims = keys.verify(token)?;
        let exp = claims.get("exp").and_then(|v| v.as_i64()).ok_or_else(invalid)?;
        if Utc::now().timestamp() > exp {
            return Err(invalid());
        }

        let user_id = claims.get("sub").and_then(|v| v.as_i64()).ok_or_else(invalid)?;
        let username = claims
            .get("username")
            .and_then(|v| v.as_str())
            .ok_or_else(invalid)?
            .to_string();
        let app_id = claims
            .get("app_id")
            .and_then(|v| v.as_i64())
            .ok_or_else(invalid)? as i32;
        let role_wire = claims
            .get("role")
            .and_then(|v| v.as_i64())
            .ok_or_else(invalid)? as i32;
        let role = Role::from_wire(role_wire).map_err(|_| invalid())?;
        let photo_url = claims
            .get("photo_url")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(AccessTokenData {
            user_id,
            app_id,
            username,
            photo_url,
            role,
            exp,
        })
    }

    pub fn parse_refresh_token(
        keys: &TokenKeys,
        token: &str,
    ) -> Result<RefreshTokenData, ApiError> {
        let invalid = || ApiError::Unauthenticated("invalid token".into());

        let claims = keys.verify(token)?;
        let exp = claims.get("exp").and_then(|v| v.as_i64()).ok_or_else(invalid)?;
        if Utc::now().timestamp() > exp {
            return Err(invalid());
        }
        let user_id = claims.get("sub").and_then(|v| v.as_i64()).ok_or_else(invalid)?;

        Ok(RefreshTokenData { user_id, exp })
    }

    /// Accepts `Authorization: Bearer <token>` or a bare token value.
    fn extract_token(headers: &HeaderMap) -> Result<String, ApiError> {
        let value = headers
            .get(http::header::AUTHORIZATION)
            .ok_or_else(|| ApiError::PermissionDenied("authorization token not found".into()))?
            .to_str()
            .map_err(|_| ApiError::Unauthenticated("invalid token".into()))?;

        let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        if token.is_empty() {
            return Err(ApiError::PermissionDenied("authorization token not found".into()));
        }
        Ok(token.to_string())
    }

    /// Identity middleware for every method outside the auth allow-list:
    /// verifies the access token and attaches the caller identity.
    pub async fn auth_middleware(
        State(state): State<Arc<AppState>>,
        mut req: Request<axum::body::Body>,
        next: Next,
    ) -> Result<Response, Response> {
        let token = Self::extract_token(req.headers()).map_err(|e| e.into_response())?;

        let data = Self::parse_access_token(&state.keys, &token).map_err(|e| {
            warn!("auth.middleware: access token rejected");
            e.into_response()
        })?;

        req.extensions_mut().insert(data);
        Ok(next.run(req).await)
    }

    /// Telegram login-widget signature: HMAC-SHA-256 over the sorted
    /// `key=value` lines of the payload, keyed by SHA-256(bot token).
    pub fn verify_telegram_login(
        payload: &TelegramLoginRequest,
        bot_token: &str,
    ) -> Result<(), ApiError> {
        let age = Utc::now().timestamp() - payload.auth_date;
        if age > TELEGRAM_AUTH_MAX_AGE_SECS {
            return Err(ApiError::Unauthenticated("telegram auth data expired".into()));
        }

        let mac = telegram_mac(payload, bot_token);

        let provided = hex::decode(&payload.hash)
            .map_err(|_| ApiError::Unauthenticated("invalid telegram hash".into()))?;
        mac.verify_slice(&provided)
            .map_err(|_| ApiError::Unauthenticated("invalid telegram hash".into()))
    }
}

fn telegram_mac(payload: &TelegramLoginRequest, bot_token: &str) -> HmacSha256 {
    let mut fields: Vec<String> = vec![
        format!("auth_date={}", payload.auth_date),
        format!("id={}", payload.telegram_id),
        format!("username={}", payload.username),
    ];
    if let Some(first_name) = &payload.first_name {
        fields.push(format!("first_name={}", first_name));
    }
    if let Some(last_name) = &payload.last_name {
        fields.push(format!("last_name={}", last_name));
    }
    if let Some(photo_url) = &payload.photo_url {
        fields.push(format!("photo_url={}", photo_url));
    }
    fields.sort();

    let secret = Sha256::digest(bot_token.as_bytes());
    let mut mac = HmacSha256::new_from_slice(&secret).expect("HMAC accepts keys of any length");
    mac.update(fields.join("\n").as_bytes());
    mac
}

/// Computes the widget-side hash; used by clients and tests to produce
/// payloads this service will accept.
pub fn telegram_login_hash(payload: &TelegramLoginRequest, bot_token: &str) -> String {
    hex::encode(telegram_mac(payload, bot_token).finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;
    use payvault_primitives::models::Credentials;

    fn test_keys() -> TokenKeys {
        let signing = SigningKey::from_bytes(&[3u8; 32]);
        TokenKeys::from_hex(&hex::encode(signing.to_keypair_bytes())).unwrap()
    }

    fn test_user() -> User {
        User {
            id: 11,
            username: "alice".into(),
            first_name: None,
            last_name: None,
            photo_url: Some("https://cdn.example/a.png".into()),
            balance: 1000,
            reserved_balance: 0,
            app_id: 1,
            role: Role::Admin,
            credentials: Credentials::Email {
                email: "alice@example.com".into(),
                pass_hash: "00".into(),
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = SecurityConfig::hash_password("hunter2secret", "process-secret");
        assert!(SecurityConfig::verify_password("hunter2secret", "process-secret", &hash));
        assert!(!SecurityConfig::verify_password("hunter3secret", "process-secret", &hash));
        assert!(!SecurityConfig::verify_password("hunter2secret", "other-secret", &hash));
        assert!(!SecurityConfig::verify_password("hunter2secret", "process-secret", "not-hex"));
    }

    #[test]
    fn access_token_round_trip() {
        let keys = test_keys();
        let user = test_user();
        let token =
            SecurityConfig::mint_access_token(&keys, &user, Duration::from_secs(60)).unwrap();

        let data = SecurityConfig::parse_access_token(&keys, &token).unwrap();
        assert_eq!(data.user_id, 11);
        assert_eq!(data.app_id, 1);
        assert_eq!(data.username, "alice");
        assert_eq!(data.role, Role::Admin);
        assert_eq!(data.photo_url.as_deref(), Some("https://cdn.example/a.png"));
    }

    #[test]
    fn expired_access_token_rejected() {
        let keys = test_keys();
        let user = test_user();
        let token =
            SecurityConfig::mint_access_token(&keys, &user, Duration::from_secs(0)).unwrap();
        // exp == now is still valid; one second in the past is not
        let claims = json!({
            "sub": user.id, "app_id": user.app_id, "username": user.username,
            "photo_url": user.photo_url, "role": user.role.as_wire(),
            "exp": Utc::now().timestamp() - 1,
        });
        let stale = keys.sign(&claims).unwrap();
        assert!(SecurityConfig::parse_access_token(&keys, &stale).is_err());
        let _ = token;
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let keys = test_keys();
        let (refresh, _) =
            SecurityConfig::mint_refresh_token(&keys, 11, Duration::from_secs(60)).unwrap();
        assert!(SecurityConfig::parse_access_token(&keys, &refresh).is_err());
        assert_eq!(
            SecurityConfig::parse_refresh_token(&keys, &refresh).unwrap().user_id,
            11
        );
    }

    #[test]
    fn telegram_hash_round_trip() {
        let mut payload = TelegramLoginRequest {
            telegram_id: 99,
            username: "bob".into(),
            first_name: Some("Bob".into()),
            last_name: None,
            photo_url: None,
            auth_date: Utc::now().timestamp(),
            hash: String::new(),
            app_id: 1,
        };
        payload.hash = telegram_login_hash(&payload, "123456:bot-token");

        assert!(SecurityConfig::verify_telegram_login(&payload, "123456:bot-token").is_ok());
        assert!(SecurityConfig::verify_telegram_login(&payload, "wrong-token").is_err());

        payload.username = "mallory".into();
        assert!(SecurityConfig::verify_telegram_login(&payload, "123456:bot-token").is_err());
    }

    #[test]
    fn stale_telegram_payload_rejected() {
        let mut payload = TelegramLoginRequest {
            telegram_id: 99,
            username: "bob".into(),
            first_name: None,
            last_name: None,
            photo_url: None,
            auth_date: Utc::now().timestamp() - 2 * TELEGRAM_AUTH_MAX_AGE_SECS,
            hash: String::new(),
            app_id: 1,
        };
        payload.hash = telegram_login_hash(&payload, "t");
        assert!(SecurityConfig::verify_telegram_login(&payload, "t").is_err());
    }
}
