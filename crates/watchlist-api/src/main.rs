//! Binary entrypoint for the watchlist API server.
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use watchlist_api::{run, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,watchlist_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Listen address, data directory and policies come from WATCHLIST_* variables
    let config = ServiceConfig::from_env().context("invalid configuration")?;
    run(config).await.context("watchlist service stopped")?;
    Ok(())
}
