use bb8_redis::RedisConnectionManager;
use diesel::r2d2::{self, ConnectionManager};
use diesel::PgConnection;
use eyre::Result;
use secrecy::ExposeSecret;
use std::sync::Arc;

use payvault_primitives::models::AppConfig;

use crate::paseto::TokenKeys;

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;
pub type RedisPool = bb8::Pool<RedisConnectionManager>;

/// Process-scoped handles, built once at startup and passed by reference into
/// every component. Nothing reads these from globals at call time.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub redis: RedisPool,
    pub config: AppConfig,
    pub keys: TokenKeys,
}

impl AppState {
    pub fn new(db: DbPool, redis: RedisPool, config: AppConfig) -> Result<Arc<Self>> {
        let keys = TokenKeys::from_hex(config.token.private_key.expose_secret())?;

        Ok(Arc::new(Self {
            db,
            redis,
            config,
            keys,
        }))
    }
}
