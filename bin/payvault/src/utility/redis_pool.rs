use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use eyre::Report;
use tracing::info;

use payvault_primitives::models::AppConfig;

pub async fn create_redis_pool(config: &AppConfig) -> Result<Pool<RedisConnectionManager>, Report> {
    let manager = RedisConnectionManager::new(config.redis.url.as_str())?;
    let pool = Pool::builder().max_size(15).build(manager).await?;

    info!("Redis connection pool created (max_size: 15)");

    Ok(pool)
}
