use eyre::{eyre, Report};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ReservationInfo {
    /// How long a fresh hold stays valid before the reaper may cancel it.
    pub reserve_ttl: Duration,
    pub reaper_interval: Duration,
    pub reaper_batch: i64,
    pub idempotency_pending_ttl: Duration,
    pub idempotency_success_ttl: Duration,
    pub idempotency_failed_ttl: Duration,
}

impl ReservationInfo {
    pub fn new() -> Result<Self, Report> {
        let reserve_minutes: u64 = env::var("RESERVE_TTL_MIN")
            .unwrap_or_else(|_| "15".into())
            .parse()
            .map_err(|e| eyre!("Invalid RESERVE_TTL_MIN: {}", e))?;

        let interval_secs: u64 = env::var("REAPER_INTERVAL_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .map_err(|e| eyre!("Invalid REAPER_INTERVAL_SECS: {}", e))?;

        let batch: i64 = env::var("REAPER_BATCH_SIZE")
            .unwrap_or_else(|_| "100".into())
            .parse()
            .map_err(|e| eyre!("Invalid REAPER_BATCH_SIZE: {}", e))?;
        if batch < 1 {
            return Err(eyre!("REAPER_BATCH_SIZE must be positive"));
        }

        Ok(Self {
            reserve_ttl: Duration::from_secs(reserve_minutes * 60),
            reaper_interval: Duration::from_secs(interval_secs),
            reaper_batch: batch,
            idempotency_pending_ttl: Duration::from_secs(5 * 60),
            idempotency_success_ttl: Duration::from_secs(24 * 60 * 60),
            idempotency_failed_ttl: Duration::from_secs(5 * 60),
        })
    }
}
