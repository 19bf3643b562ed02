//! Edge gateway (v1)
//!
//! Shields a client application from talking to third-party hosts directly.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │                   EDGE GATEWAY                   │
//!   GET /proxy?url=     │  ┌──────────┐   ┌─────────────┐                  │
//!   ────────────────────┼─▶│ handlers │──▶│  allowlist  │──▶ passthrough ──┼──▶ allowlisted host
//!                       │  │          │   └─────────────┘     fetcher      │
//!   GET /search?q=      │  │          │   ┌─────────────┐                  │
//!   ────────────────────┼─▶│          │──▶│ aggregator  │──▶ family A ... ─┼──▶ mirror instances
//!                       │  └────┬─────┘   │ + registry  │    family B ...  │    (in order)
//!                       │       │         └─────────────┘                  │
//!   ◀───────────────────┼───────┴── response envelope (status, JSON errors) │
//!                       │                                                  │
//!                       │  config · observability · lifecycle · CORS       │
//!                       └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_gateway::config::{load_config, GatewayConfig};
use edge_gateway::observability::{logging, metrics};
use edge_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "edge-gateway")]
#[command(about = "Allowlisted passthrough and federated search gateway", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("edge-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        attempt_timeout_ms = config.search.attempt_timeout_ms,
        config_file = ?args.config,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
