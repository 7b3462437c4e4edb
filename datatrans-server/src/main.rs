//! Datatrans Webhook Receiver
//!
//! Accepts transaction status pushes from Datatrans and rejects any
//! delivery whose `Datatrans-Signature` does not match its body.

mod api;
mod config;
mod server;
mod shutdown;

use clap::Parser;
use config::ConfigLoader;
use server::{build_router, run_server};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Datatrans webhook receiver
#[derive(Parser, Debug)]
#[command(name = "datatrans-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./datatrans-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting datatrans-server v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = ConfigLoader::new(&args.config, args.listen);
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let router = build_router(&loaded_config).map_err(|e| {
        tracing::error!("Failed to build webhook layer: {}", e);
        e
    })?;

    tracing::info!(
        path = %loaded_config.webhook.path,
        "Starting HTTP server on {}",
        loaded_config.listen
    );
    run_server(router, loaded_config.listen).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
