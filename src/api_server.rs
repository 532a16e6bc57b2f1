// src/api_server.rs

use anyhow::Result;
use flight_optimizer::{
    init_logging, server::router, LogConfig, Optimizer, ServiceConfig, TequilaClient,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging before anything else
    if let Err(e) = init_logging(&LogConfig::from_env("flight-optimizer-api.log")) {
        eprintln!("Failed to initialize logging: {}", e);
        // Continue without logging rather than failing
    }

    let config = ServiceConfig::from_env()?;
    info!(
        tequila_base = %config.tequila_base,
        default_currency = %config.default_currency,
        "Starting flight optimizer API"
    );

    let tequila = TequilaClient::new(&config.tequila_base, &config.api_key)?;
    let optimizer = Arc::new(Optimizer::new(tequila, config.default_currency.clone()));
    let app = router(optimizer);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    let addr = listener.local_addr()?;
    info!(addr = %addr, "Listening for POST /optimize");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Flight optimizer API shut down");
    Ok(())
}
