//! Relay entry point.
//!
//! Loads configuration from the environment, builds the immutable region
//! registry, and serves the HTTP endpoint. Startup failures and fatal server
//! errors are logged and exit non-zero; restarting is the host supervisor's
//! job, not this process's.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use shipline_relay::{
    server, AppState, CommerceGateway, Orchestrator, RegionRegistry, RelayConfig,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        tracing::error!(%err, "fatal");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = RelayConfig::from_env()?;
    let registry = RegionRegistry::from_entries(config.regions().to_vec())?;
    if registry.is_empty() {
        tracing::warn!("no regions configured; every request will be rejected");
    }

    let orchestrator = Orchestrator::new(CommerceGateway::new(&config));
    let state = Arc::new(AppState::new(&config, registry, orchestrator));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port()));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, api_version = %config.api_version(), "shipline-relay listening");

    axum::serve(listener, server::router(state)).await?;
    Ok(())
}
