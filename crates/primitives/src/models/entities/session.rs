use chrono::{DateTime, Utc};

/// Server-tracked refresh session, one per (user, device fingerprint). Lives
/// in the TTL cache under `user:{user_id}:{fingerprint}`; a fresh login or
/// refresh on the same device overwrites it.
#[derive(Debug, Clone)]
pub struct RefreshSession {
    pub user_id: i64,
    pub app_id: i32,
    pub fingerprint: String,
    pub refresh_token: String,
    pub user_agent: String,
    pub ip: String,
    pub expires_in: i64,
    pub created_at: DateTime<Utc>,
}
