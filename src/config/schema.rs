//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct BalancerConfig {
    /// Listener configuration (port, bind host, body limit).
    pub listener: ListenerConfig,

    /// Server selection policy.
    pub algorithm: Algorithm,

    /// Pin clients to the backend that served their first request.
    pub enable_sticky_session: bool,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Backend server definitions. Order matters: routes refer to servers by index.
    pub servers: Vec<ServerConfig>,

    /// Route definitions mapping path patterns to servers.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Sticky session settings.
    pub session: SessionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin / stats API settings.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListenerConfig {
    /// Port to accept client traffic on.
    pub port: u16,

    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// Largest request body buffered for forwarding.
    pub max_body_bytes: usize,
}

impl ListenerConfig {
    /// The `host:port` string handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            bind_host: "0.0.0.0".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Load balancing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    #[default]
    RoundRobin,
    WeightedRoundRobin,
    LeastConnections,
    WeightedLeastConnections,
}

impl Algorithm {
    /// The configuration spelling of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::RoundRobin => "round-robin",
            Algorithm::WeightedRoundRobin => "weighted-round-robin",
            Algorithm::LeastConnections => "least-connections",
            Algorithm::WeightedLeastConnections => "weighted-least-connections",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Base URL of the backend (e.g., "http://127.0.0.1:3001").
    pub url: String,

    /// Weight for weighted load balancing (default: 1).
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl ServerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            weight: default_weight(),
        }
    }

    pub fn weighted(url: impl Into<String>, weight: u32) -> Self {
        Self {
            url: url.into(),
            weight,
        }
    }
}

/// Route configuration mapping a path pattern to a subset of servers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Path pattern; `*` matches any run of characters.
    pub path: String,

    /// Indices into `servers`, in preference order.
    pub servers: Vec<usize>,

    /// Remove the pattern's literal prefix before forwarding.
    #[serde(default)]
    pub strip_prefix: bool,
}

impl RouteConfig {
    pub fn new(path: impl Into<String>, servers: Vec<usize>) -> Self {
        Self {
            path: path.into(),
            servers,
            strip_prefix: false,
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthCheckConfig {
    /// Path probed on every backend.
    pub endpoint: String,

    /// Seconds between probe cycles.
    pub interval_secs: u64,

    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            endpoint: "/health".to_string(),
            interval_secs: 10,
            timeout_secs: 3,
        }
    }
}

/// Timeout configuration for forwarded requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutConfig {
    /// Upper bound for a single forward attempt, in seconds.
    pub forward_secs: u64,
}

impl TimeoutConfig {
    pub fn forward(&self) -> Duration {
        Duration::from_secs(self.forward_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { forward_secs: 5 }
    }
}

/// Sticky session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// `Max-Age` attribute of the affinity cookie, in seconds.
    pub cookie_max_age_secs: u64,

    /// Evict sessions older than this. `None` keeps sessions forever.
    pub ttl_secs: Option<u64>,

    /// How often the sweeper looks for expired sessions.
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_max_age_secs: 24 * 60 * 60,
            ttl_secs: None,
            sweep_interval_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin / stats API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdminConfig {
    /// Serve the stats API.
    pub enabled: bool,

    /// Stats API bind address.
    pub bind_address: String,

    /// Bearer token required by the API. Open when unset.
    pub api_key: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:4001".to_string(),
            api_key: None,
        }
    }
}

/// Single-object JSON layout: port at the top level, camelCase keys and a
/// two-field health check. Everything it cannot express takes its default.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompactConfig {
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub algorithm: Algorithm,
    #[serde(default)]
    pub enable_sticky_session: bool,
    #[serde(default)]
    pub health_check: Option<CompactHealthCheck>,
    pub servers: Vec<ServerConfig>,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// `healthCheck` block of the compact layout. `interval` is in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompactHealthCheck {
    pub endpoint: String,
    pub interval: u64,
}

impl CompactConfig {
    /// Keys that only the compact layout uses at the top level.
    pub const MARKER_KEYS: [&'static str; 3] = ["port", "enableStickySession", "healthCheck"];
}

impl From<CompactConfig> for BalancerConfig {
    fn from(compact: CompactConfig) -> Self {
        let mut config = BalancerConfig {
            algorithm: compact.algorithm,
            enable_sticky_session: compact.enable_sticky_session,
            servers: compact.servers,
            routes: compact.routes,
            ..Default::default()
        };
        if let Some(port) = compact.port {
            config.listener.port = port;
        }
        if let Some(health) = compact.health_check {
            config.health_check.endpoint = health.endpoint;
            config.health_check.interval_secs = health.interval;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml() {
        let config: BalancerConfig = toml::from_str(
            r#"
            algorithm = "weighted-least-connections"

            [[servers]]
            url = "http://127.0.0.1:3001"

            [[servers]]
            url = "http://127.0.0.1:3002"
            weight = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.algorithm, Algorithm::WeightedLeastConnections);
        assert_eq!(config.servers[0].weight, 1);
        assert_eq!(config.servers[1].weight, 3);
        assert_eq!(config.listener.port, 4000);
        assert_eq!(config.health_check.timeout_secs, 3);
        assert_eq!(config.timeouts.forward_secs, 5);
        assert!(!config.enable_sticky_session);
        assert!(config.session.ttl_secs.is_none());
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let result: Result<BalancerConfig, _> = toml::from_str(r#"algorithm = "random""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_algorithm_display() {
        assert_eq!(Algorithm::WeightedRoundRobin.to_string(), "weighted-round-robin");
    }

    #[test]
    fn test_misspelled_keys_rejected() {
        let top: Result<BalancerConfig, _> = toml::from_str(r#"enable_sticky_sessions = true"#);
        assert!(top.is_err());

        let nested: Result<BalancerConfig, _> = toml::from_str(
            r#"
            [health_check]
            interval = 5
            "#,
        );
        assert!(nested.is_err());

        let server: Result<BalancerConfig, _> = toml::from_str(
            r#"
            [[servers]]
            url = "http://127.0.0.1:3001"
            wieght = 2
            "#,
        );
        assert!(server.is_err());
    }

    #[test]
    fn test_compact_layout_converts() {
        let compact: CompactConfig = serde_json::from_str(
            r#"{
                "port": 8080,
                "algorithm": "least-connections",
                "enableStickySession": true,
                "healthCheck": { "endpoint": "/status", "interval": 2 },
                "servers": [{ "url": "http://127.0.0.1:3001", "weight": 2 }],
                "routes": [{ "path": "/api/*", "servers": [0] }]
            }"#,
        )
        .unwrap();

        let config = BalancerConfig::from(compact);
        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.algorithm, Algorithm::LeastConnections);
        assert!(config.enable_sticky_session);
        assert_eq!(config.health_check.endpoint, "/status");
        assert_eq!(config.health_check.interval_secs, 2);
        assert_eq!(config.health_check.timeout_secs, 3);
        assert_eq!(config.servers[0].weight, 2);
        assert_eq!(config.routes[0].servers, vec![0]);
    }
}
