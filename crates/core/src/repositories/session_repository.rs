use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use std::collections::HashMap;
use std::time::Duration;

use payvault_primitives::error::ApiError;
use payvault_primitives::models::RefreshSession;

use crate::app_state::RedisPool;

/// Refresh sessions in the TTL cache, keyed `user:{user_id}:{fingerprint}`.
/// The fingerprint scope lets one user rotate a single device without
/// touching the others.
pub struct SessionRepository;

impl SessionRepository {
    fn key(user_id: i64, fingerprint: &str) -> String {
        format!("user:{}:{}", user_id, fingerprint)
    }

    /// Overwrites any prior session under the same (user, fingerprint).
    pub async fn save(
        redis: &RedisPool,
        session: &RefreshSession,
        ttl: Duration,
    ) -> Result<(), ApiError> {
        let key = Self::key(session.user_id, &session.fingerprint);
        let fields = [
            ("refresh_token", session.refresh_token.clone()),
            ("user_id", session.user_id.to_string()),
            ("app_id", session.app_id.to_string()),
            ("fingerprint", session.fingerprint.clone()),
            ("ua", session.user_agent.clone()),
            ("ip", session.ip.clone()),
            ("expires_in", session.expires_in.to_string()),
            ("created_at", session.created_at.to_rfc3339()),
        ];

        let mut conn = redis.get().await?;
        let _: () = conn.hset_multiple(&key, &fields).await?;
        let _: () = conn.expire(&key, ttl.as_secs() as i64).await?;
        Ok(())
    }

    /// Resolves the session for a device fingerprint via a keyspace scan.
    /// The user id embedded in the matched key must agree with the stored
    /// record; a forged or cross-user entry is treated as absent.
    pub async fn find_by_fingerprint(
        redis: &RedisPool,
        fingerprint: &str,
    ) -> Result<RefreshSession, ApiError> {
        let mut conn = redis.get().await?;
        let keys: Vec<String> = conn.keys(format!("user:*:{}", fingerprint)).await?;

        let key = keys
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound("refresh session not found".into()))?;

        let session = Self::read(&mut conn, &key).await?;

        let key_user_id = key
            .split(':')
            .nth(1)
            .and_then(|part| part.parse::<i64>().ok());
        if key_user_id != Some(session.user_id) {
            return Err(ApiError::NotFound("refresh session not found".into()));
        }

        Ok(session)
    }

    /// All live sessions for a user. Evicted entries are simply absent; an
    /// empty device list is not an error.
    pub async fn list_by_user(
        redis: &RedisPool,
        user_id: i64,
    ) -> Result<Vec<RefreshSession>, ApiError> {
        let mut conn = redis.get().await?;
        let keys: Vec<String> = conn.keys(format!("user:{}:*", user_id)).await?;

        let mut sessions = Vec::with_capacity(keys.len());
        for key in keys {
            sessions.push(Self::read(&mut conn, &key).await?);
        }
        Ok(sessions)
    }

    /// Idempotent removal.
    pub async fn delete(
        redis: &RedisPool,
        user_id: i64,
        fingerprint: &str,
    ) -> Result<(), ApiError> {
        let mut conn = redis.get().await?;
        let _: () = conn.del(Self::key(user_id, fingerprint)).await?;
        Ok(())
    }

    async fn read(
        conn: &mut redis::aio::MultiplexedConnection,
        key: &str,
    ) -> Result<RefreshSession, ApiError> {
        let fields: HashMap<String, String> = conn.hgetall(key).await?;
        if fields.is_empty() {
            return Err(ApiError::NotFound("refresh session not found".into()));
        }

        let get = |name: &str| -> Result<String, ApiError> {
            fields
                .get(name)
                .cloned()
                .ok_or_else(|| ApiError::Cache(format!("session field {} missing in {}", name, key)))
        };

        let user_id = get("user_id")?
            .parse::<i64>()
            .map_err(|e| ApiError::Cache(format!("invalid user_id in {}: {}", key, e)))?;
        let app_id = get("app_id")?
            .parse::<i32>()
            .map_err(|e| ApiError::Cache(format!("invalid app_id in {}: {}", key, e)))?;
        let expires_in = get("expires_in")?
            .parse::<i64>()
            .map_err(|e| ApiError::Cache(format!("invalid expires_in in {}: {}", key, e)))?;
        let created_at = DateTime::parse_from_rfc3339(&get("created_at")?)
            .map_err(|e| ApiError::Cache(format!("invalid created_at in {}: {}", key, e)))?
            .with_timezone(&Utc);

        Ok(RefreshSession {
            user_id,
            app_id,
            fingerprint: get("fingerprint")?,
            refresh_token: get("refresh_token")?,
            user_agent: get("ua")?,
            ip: get("ip")?,
            expires_in,
            created_at,
        })
    }
}
