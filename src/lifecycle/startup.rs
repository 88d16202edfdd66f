//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Start background tasks (health checks, session sweeping, metrics)
//! - Bind listeners and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The first health probe runs as soon as the monitor starts, so the pool
//!   becomes routable within one probe timeout of boot

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;

use super::signals::spawn_signal_handler;
use super::Shutdown;
use crate::admin::{setup_admin_router, AdminState};
use crate::config::BalancerConfig;
use crate::dispatch::DispatchEngine;
use crate::http::HttpServer;
use crate::observability::{metrics, StatsCollector};

/// How long background tasks get to exit after the listeners stop.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid backend url: {0}")]
    Backend(#[from] url::ParseError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address).await.map_err(|source| StartupError::Bind {
        address: address.to_string(),
        source,
    })
}

fn log_banner(config: &BalancerConfig) {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.listener.port,
        algorithm = %config.algorithm,
        sticky_sessions = config.enable_sticky_session,
        health_interval_secs = config.health_check.interval_secs,
        "http-balancer starting"
    );
    for (index, server) in config.servers.iter().enumerate() {
        tracing::info!(index, url = %server.url, weight = server.weight, "Backend configured");
    }
    for route in &config.routes {
        tracing::info!(path = %route.path, servers = ?route.servers, "Route configured");
    }
}

/// Run the balancer until SIGINT/SIGTERM.
pub async fn run(config: BalancerConfig) -> Result<(), StartupError> {
    log_banner(&config);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let stats = Arc::new(StatsCollector::new(config.algorithm));
    let engine = Arc::new(DispatchEngine::from_config(&config, stats)?);

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let admin = if config.admin.enabled {
        let listener = bind(&config.admin.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Admin API listening");
        let router = setup_admin_router(AdminState {
            engine: engine.clone(),
            api_key: config.admin.api_key.clone(),
        });
        let mut admin_shutdown = shutdown.subscribe();
        Some(tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = admin_shutdown.recv().await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!(error = %e, "Admin server failed");
            }
        }))
    } else {
        None
    };

    let listener = bind(&config.listener.bind_address()).await?;
    let server = HttpServer::with_engine(config, engine);
    server.run(listener, shutdown.subscribe()).await?;

    if let Some(admin) = admin {
        let _ = admin.await;
    }

    if !shutdown.drained(DRAIN_TIMEOUT).await {
        tracing::warn!(
            remaining = shutdown.receiver_count(),
            "Background tasks still running at exit"
        );
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
