pub mod db_pool;
pub mod logging;
pub mod redis_pool;
pub mod server;
pub mod shutdown;
pub mod tasks;
