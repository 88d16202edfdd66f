//! HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────┐    ┌──────────┐    ┌──────────────┐
//!     ───────────────────▶│   http   │───▶│ routing  │───▶│    health    │
//!                         │  server  │    │  table   │    │   registry   │
//!                         └──────────┘    └──────────┘    └──────┬───────┘
//!                                                                │
//!                                                                ▼
//!                         ┌──────────┐    ┌──────────┐    ┌──────────────┐
//!     ◀───────────────────│ envelope │◀───│ forwarder│◀───│  affinity /  │
//!     Client Response     │ response │    │          │    │   selector   │
//!                         └──────────┘    └────┬─────┘    └──────────────┘
//!                                              │
//!                                              ▼
//!                                          Backend
//! ```

use clap::Parser;
use std::path::PathBuf;

use http_balancer::config::load_config;
use http_balancer::observability::logging;

#[derive(Parser)]
#[command(name = "http-balancer")]
#[command(about = "Reverse-proxy HTTP load balancer", long_about = None)]
struct Args {
    /// Configuration file (TOML, or JSON by extension)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the listening port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load {}: {}", args.config.display(), e);
            std::process::exit(1);
        }
    };
    if let Some(port) = args.port {
        config.listener.port = port;
    }

    logging::init(&config.observability);
    tracing::info!(path = %args.config.display(), "Configuration loaded");

    http_balancer::lifecycle::run(config).await?;
    Ok(())
}
