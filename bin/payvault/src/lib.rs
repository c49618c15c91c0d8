// Library entry point so the integration tests can drive the same router
// and state the binary runs.

pub mod observability;
pub mod utility;

use eyre::Report;
use std::sync::Arc;
use tracing::info;

use payvault_core::reaper::ExpiryReaper;
use payvault_core::AppState;
use payvault_primitives::models::AppConfig;

use crate::observability::metrics::setup_metrics;
use crate::utility::db_pool::create_db_pool;
use crate::utility::logging::setup_logging;
use crate::utility::redis_pool::create_redis_pool;
use crate::utility::server::{bind_addr, serve};
use crate::utility::tasks::{build_router, load_env};

pub async fn run() -> Result<(), Report> {
    setup_logging();
    info!("Starting payvault service...");

    load_env();
    let config = AppConfig::from_env()?;

    let db = create_db_pool(&config)?;
    let redis = create_redis_pool(&config).await?;
    let state = AppState::new(db, redis, config)?;

    let reaper = Arc::new(ExpiryReaper::new(
        state.db.clone(),
        state.config.reservation.reaper_interval,
        state.config.reservation.reaper_batch,
    ));
    reaper.start();

    let (metric_layer, metric_handle) = setup_metrics();
    let app = build_router(state.clone(), metric_layer, metric_handle)?;

    serve(app, bind_addr()?).await?;

    reaper.stop().await;
    info!("payvault shut down gracefully");
    Ok(())
}
