//! module-router demo server.
//!
//! ```text
//!     Client Request
//!     ──────▶ request id ─▶ trace ─▶ timeout ─▶ global Before
//!                                                   │
//!                     ┌─────────────────────────────┤
//!                     ▼                             ▼
//!              route (method, path)         unmatched request
//!                     │                             │
//!       fresh module ─▶ Before ─▶ handler    known path? ── yes ─▶ 405
//!                     ─▶ After                      │ no
//!                     ─▶ status-code handler        ▼
//!                     │                            404
//!                     ▼                             │
//!                global After ◀─────────────────────┘
//!                     │
//!     ◀───────────────┘ Client Response
//! ```

mod demo;

use std::path::PathBuf;

use clap::Parser;

use module_router::config::{load_config, ServerConfig};
use module_router::lifecycle::{serve, Shutdown};
use module_router::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "module-router")]
#[command(about = "Serve the demo module composition", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!("module-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_size = config.limits.max_body_size,
        "Configuration loaded"
    );

    let app = demo::app().body_limit(config.limits.max_body_size).build()?;

    let shutdown = Shutdown::new();
    serve(config, app, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
