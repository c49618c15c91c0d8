use eyre::{eyre, Report};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Failed-login budget per IP inside the counter window.
    pub max_attempts: i64,
    pub attempts_window: Duration,
    pub block_time: Duration,
    /// Token bucket on the login route: `login_burst` requests, one token
    /// replenished every `login_replenish`.
    pub login_burst: u32,
    pub login_replenish: Duration,
}

impl RateLimitInfo {
    pub fn new() -> Result<Self, Report> {
        let max_attempts: i64 = env::var("RATE_LIMIT_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .map_err(|e| eyre!("Invalid RATE_LIMIT_MAX_ATTEMPTS: {}", e))?;
        if max_attempts < 1 {
            return Err(eyre!("RATE_LIMIT_MAX_ATTEMPTS must be positive"));
        }

        let block_secs: u64 = env::var("RATE_LIMIT_BLOCK_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .map_err(|e| eyre!("Invalid RATE_LIMIT_BLOCK_SECS: {}", e))?;

        Ok(Self {
            max_attempts,
            attempts_window: Duration::from_secs(600),
            block_time: Duration::from_secs(block_secs),
            login_burst: 3,
            login_replenish: Duration::from_secs(20),
        })
    }
}
