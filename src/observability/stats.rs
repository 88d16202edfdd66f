//! In-process stats collector.
//!
//! # Responsibilities
//! - Receive request, error and health notifications from the core
//! - Keep running totals per backend
//! - Hand out serializable snapshots for the stats API
//!
//! The collector never influences request outcomes; every call is a
//! fire-and-forget update.

use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Instant;

use crate::config::Algorithm;

/// Per-backend request totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ServerStats {
    pub requests: u64,
    pub errors: u64,
}

/// Point-in-time view of the collector.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub server_stats: BTreeMap<String, ServerStats>,
    pub healthy_servers: Vec<String>,
    pub dead_servers: Vec<String>,
    pub algorithm: Algorithm,
    pub uptime_secs: u64,
}

#[derive(Debug, Default)]
struct HealthView {
    healthy: Vec<String>,
    dead: Vec<String>,
}

/// Collects balancer activity for the stats API.
#[derive(Debug)]
pub struct StatsCollector {
    algorithm: Algorithm,
    started: Instant,
    total_requests: AtomicU64,
    servers: DashMap<String, ServerStats>,
    health: RwLock<HealthView>,
}

impl StatsCollector {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            started: Instant::now(),
            total_requests: AtomicU64::new(0),
            servers: DashMap::new(),
            health: RwLock::new(HealthView::default()),
        }
    }

    /// A request was dispatched to `server`.
    pub fn record_request(&self, server: &str) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.servers.entry(server.to_string()).or_default().requests += 1;
    }

    /// A request dispatched to `server` failed.
    pub fn record_error(&self, server: &str) {
        self.servers.entry(server.to_string()).or_default().errors += 1;
    }

    /// Replace the published health partition.
    pub fn update_server_health(&self, healthy: Vec<String>, dead: Vec<String>) {
        let mut view = self.health.write().unwrap_or_else(PoisonError::into_inner);
        view.healthy = healthy;
        view.dead = dead;
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn server(&self, server: &str) -> ServerStats {
        self.servers.get(server).map(|s| *s).unwrap_or_default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let view = self.health.read().unwrap_or_else(PoisonError::into_inner);
        StatsSnapshot {
            total_requests: self.total_requests(),
            server_stats: self
                .servers
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect(),
            healthy_servers: view.healthy.clone(),
            dead_servers: view.dead.clone(),
            algorithm: self.algorithm,
            uptime_secs: self.started.elapsed().as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let stats = StatsCollector::new(Algorithm::RoundRobin);
        stats.record_request("http://a");
        stats.record_request("http://a");
        stats.record_request("http://b");
        stats.record_error("http://a");

        assert_eq!(stats.total_requests(), 3);
        assert_eq!(stats.server("http://a"), ServerStats { requests: 2, errors: 1 });
        assert_eq!(stats.server("http://b"), ServerStats { requests: 1, errors: 0 });
        assert_eq!(stats.server("http://c"), ServerStats::default());
    }

    #[test]
    fn test_snapshot_shape() {
        let stats = StatsCollector::new(Algorithm::LeastConnections);
        stats.record_request("http://a");
        stats.update_server_health(vec!["http://a".into()], vec!["http://b".into()]);

        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["totalRequests"], 1);
        assert_eq!(json["serverStats"]["http://a"]["requests"], 1);
        assert_eq!(json["healthyServers"][0], "http://a");
        assert_eq!(json["deadServers"][0], "http://b");
        assert_eq!(json["algorithm"], "least-connections");
    }
}
