use axum::Router;
use eyre::Report;
use std::net::SocketAddr;

use crate::utility::shutdown::shutdown_signal;

pub fn bind_addr() -> Result<SocketAddr, Report> {
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".into());

    format!("{host}:{port}")
        .parse()
        .map_err(|e| eyre::eyre!("Invalid bind address {host}:{port}: {e}"))
}

/// Serves until SIGINT/SIGTERM, draining in-flight requests. ConnectInfo is
/// required: the ingress pipeline falls back to the peer address when no
/// forwarding header is present.
pub async fn serve(router: Router, addr: SocketAddr) -> Result<(), Report> {
    tracing::info!("payvault listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
