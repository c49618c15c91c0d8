pub mod app_config;
pub mod database_info;
pub mod rate_limit_info;
pub mod redis_info;
pub mod reservation_info;
pub mod telegram_info;
pub mod token_info;
