use eyre::Report;

use crate::models::app_state::database_info::DatabaseInfo;
use crate::models::app_state::rate_limit_info::RateLimitInfo;
use crate::models::app_state::redis_info::RedisInfo;
use crate::models::app_state::reservation_info::ReservationInfo;
use crate::models::app_state::telegram_info::TelegramInfo;
use crate::models::app_state::token_info::TokenInfo;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseInfo,
    pub redis: RedisInfo,
    pub token: TokenInfo,
    pub rate_limit: RateLimitInfo,
    pub reservation: ReservationInfo,
    pub telegram: TelegramInfo,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Report> {
        Ok(Self {
            database: DatabaseInfo::new()?,
            redis: RedisInfo::new()?,
            token: TokenInfo::new()?,
            rate_limit: RateLimitInfo::new()?,
            reservation: ReservationInfo::new()?,
            telegram: TelegramInfo::new()?,
        })
    }
}
