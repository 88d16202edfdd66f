//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every backend
//! - Update the health registry from the results
//! - Publish the partition to the stats collector

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::state::{HealthRegistry, Transition};
use crate::http::client::{build_client, HttpClient};
use crate::load_balancer::Backend;
use crate::observability::{metrics, StatsCollector};
use crate::resilience::with_timeout;

/// Why a single probe failed.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid probe target {0}")]
    InvalidTarget(String),

    #[error("connection error: {0}")]
    Connect(String),

    #[error("non-success status {0}")]
    Status(StatusCode),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Outcome of one probe cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub healthy: Vec<String>,
    pub dead: Vec<String>,
}

pub struct HealthMonitor {
    backends: Vec<Arc<Backend>>,
    registry: Arc<HealthRegistry>,
    stats: Arc<StatsCollector>,
    config: HealthCheckConfig,
    client: HttpClient,
}

impl HealthMonitor {
    pub fn new(
        backends: Vec<Arc<Backend>>,
        registry: Arc<HealthRegistry>,
        stats: Arc<StatsCollector>,
        config: HealthCheckConfig,
    ) -> Self {
        let client = build_client(config.timeout());

        Self {
            backends,
            registry,
            stats,
            config,
            client,
        }
    }

    /// Probe once immediately, then every `interval_secs`, until shutdown.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = self.config.interval_secs,
            endpoint = %self.config.endpoint,
            backends = self.backends.len(),
            "Health monitor starting"
        );

        // The first tick completes immediately, which gives the eager startup cycle.
        let mut ticker = time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_probe_cycle().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every backend concurrently and apply each result independently.
    pub async fn run_probe_cycle(&self) -> CycleReport {
        let outcomes = join_all(self.backends.iter().map(|backend| async move {
            let result = self.probe(backend).await;
            self.apply(backend, result)
        }))
        .await;

        let mut report = CycleReport::default();
        for (backend, healthy) in self.backends.iter().zip(outcomes) {
            if healthy {
                report.healthy.push(backend.url.clone());
            } else {
                report.dead.push(backend.url.clone());
            }
        }

        self.stats
            .update_server_health(self.registry.healthy_urls(), self.registry.dead_urls());

        tracing::debug!(
            total = self.backends.len(),
            healthy = report.healthy.len(),
            dead = report.dead.len(),
            "Health check cycle complete"
        );
        report
    }

    /// Issue one bounded GET against the backend's health endpoint.
    pub async fn probe(&self, backend: &Backend) -> Result<(), ProbeError> {
        let target = backend.target(&self.config.endpoint);
        let request = Request::builder()
            .method("GET")
            .uri(target.as_str())
            .header("user-agent", "http-balancer-health-check")
            .body(Body::empty())
            .map_err(|_| ProbeError::InvalidTarget(target.clone()))?;

        let timeout = self.config.timeout();
        match with_timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) if response.status().is_success() => Ok(()),
            Ok(Ok(response)) => Err(ProbeError::Status(response.status())),
            Ok(Err(e)) => Err(ProbeError::Connect(e.to_string())),
            Err(_) => Err(ProbeError::Timeout(timeout)),
        }
    }

    fn apply(&self, backend: &Backend, result: Result<(), ProbeError>) -> bool {
        let healthy = result.is_ok();
        match result {
            Ok(()) => {
                if self.registry.mark_healthy(&backend.url) == Transition::Recovered {
                    tracing::info!(backend = %backend.url, "Backend is now healthy");
                }
            }
            Err(e) => {
                if self.registry.mark_dead(&backend.url) == Transition::WentDown {
                    tracing::warn!(backend = %backend.url, "Backend is down");
                }
                tracing::error!(backend = %backend.url, error = %e, "Health check failed");
            }
        }
        metrics::record_backend_health(&backend.url, healthy);
        healthy
    }
}
