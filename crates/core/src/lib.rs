pub mod app_state;
pub mod paseto;
pub mod rate_limiter;
pub mod reaper;
pub mod repositories;
pub mod request_meta;
pub mod security;
pub mod services;

pub use app_state::{AppState, DbPool, RedisPool};
