// Overthinkr V1 Analyze Proxy Entry Point
// The only process that holds the upstream credential

mod config;
mod error;
mod relay;
mod routes;

use anyhow::Result;
use config::ProxyConfig;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Overthinkr proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let config = ProxyConfig::from_env()?;
    routes::serve(&config).await
}
