use anyhow::Context;
use authnz_service::{build_router, AppState, AuthnzConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AuthnzConfig::from_env().context("Failed to load authnz configuration")?;
    let addr = config.socket_addr()?;
    info!(locations = config.locations.len(), "configuration loaded");

    let app = build_router(AppState::new(config.locations));

    info!(%addr, "starting authnz-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
