use serde::Serialize;

use crate::models::entities::enum_types::Role;

/// Per-request transport facts derived by the ingress pipeline and carried as
/// an explicit value through the call chain (request extension, then plain
/// argument into the services).
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub fingerprint: String,
    pub ip: String,
    pub user_agent: String,
}

/// Verified identity attached by the identity middleware after the access
/// token checks out.
#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenData {
    pub user_id: i64,
    pub app_id: i32,
    pub username: String,
    pub photo_url: Option<String>,
    pub role: Role,
    pub exp: i64,
}

/// Subject of a verified refresh token. Refresh tokens carry nothing else.
#[derive(Debug, Clone)]
pub struct RefreshTokenData {
    pub user_id: i64,
    pub exp: i64,
}
