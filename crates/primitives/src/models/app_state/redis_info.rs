use eyre::{eyre, Report};
use std::env;

#[derive(Debug, Clone)]
pub struct RedisInfo {
    pub url: String,
}

impl RedisInfo {
    pub fn new() -> Result<Self, Report> {
        let url = env::var("REDIS_URL").map_err(|_| eyre!("REDIS_URL must be set"))?;
        if !url.starts_with("redis://") && !url.starts_with("rediss://") {
            return Err(eyre!("REDIS_URL must be a redis:// URL"));
        }
        Ok(Self { url })
    }
}
