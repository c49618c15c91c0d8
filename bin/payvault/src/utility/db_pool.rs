use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use eyre::Report;
use std::time::Duration;
use tracing::info;

use payvault_primitives::models::AppConfig;

pub fn create_db_pool(config: &AppConfig) -> Result<Pool<ConnectionManager<PgConnection>>, Report> {
    let manager = ConnectionManager::<PgConnection>::new(config.database.url());

    let pool = Pool::builder()
        .max_size(50)
        .min_idle(Some(5))
        .connection_timeout(Duration::from_secs(8))
        .idle_timeout(Some(Duration::from_secs(300)))
        .max_lifetime(Some(Duration::from_secs(1800)))
        .test_on_check_out(true)
        .build(manager)?;

    info!("PostgreSQL connection pool created (max_size: 50)");

    Ok(pool)
}
