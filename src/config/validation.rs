//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference existing servers)
//! - Validate value ranges (intervals > 0, weights > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use thiserror::Error;
use url::Url;

use crate::config::schema::BalancerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no servers configured")]
    NoServers,

    #[error("server {index}: invalid url {url:?}: {reason}")]
    InvalidUrl { index: usize, url: String, reason: String },

    #[error("server {index}: duplicate url {url:?}")]
    DuplicateUrl { index: usize, url: String },

    #[error("server {index}: weight must be at least 1")]
    ZeroWeight { index: usize },

    #[error("route {path:?}: path must start with '/'")]
    InvalidRoutePath { path: String },

    #[error("route {path:?}: no servers listed")]
    EmptyRoute { path: String },

    #[error("route {path:?}: server index {server} out of range ({count} servers)")]
    UnknownServer { path: String, server: usize, count: usize },

    #[error("health_check.endpoint must start with '/'")]
    InvalidHealthEndpoint,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.servers.is_empty() {
        errors.push(ValidationError::NoServers);
    }

    let mut seen = HashSet::new();
    for (index, server) in config.servers.iter().enumerate() {
        match Url::parse(&server.url) {
            Ok(url) if url.scheme() != "http" => errors.push(ValidationError::InvalidUrl {
                index,
                url: server.url.clone(),
                reason: format!("unsupported scheme {:?}", url.scheme()),
            }),
            Ok(url) if url.host_str().is_none() => errors.push(ValidationError::InvalidUrl {
                index,
                url: server.url.clone(),
                reason: "missing host".to_string(),
            }),
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::InvalidUrl {
                index,
                url: server.url.clone(),
                reason: e.to_string(),
            }),
        }

        if !seen.insert(server.url.trim_end_matches('/')) {
            errors.push(ValidationError::DuplicateUrl {
                index,
                url: server.url.clone(),
            });
        }

        if server.weight == 0 {
            errors.push(ValidationError::ZeroWeight { index });
        }
    }

    for route in &config.routes {
        if !route.path.starts_with('/') {
            errors.push(ValidationError::InvalidRoutePath {
                path: route.path.clone(),
            });
        }
        if route.servers.is_empty() {
            errors.push(ValidationError::EmptyRoute {
                path: route.path.clone(),
            });
        }
        for &server in &route.servers {
            if server >= config.servers.len() {
                errors.push(ValidationError::UnknownServer {
                    path: route.path.clone(),
                    server,
                    count: config.servers.len(),
                });
            }
        }
    }

    if !config.health_check.endpoint.starts_with('/') {
        errors.push(ValidationError::InvalidHealthEndpoint);
    }
    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::ZeroDuration("health_check.interval_secs"));
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration("health_check.timeout_secs"));
    }
    if config.timeouts.forward_secs == 0 {
        errors.push(ValidationError::ZeroDuration("timeouts.forward_secs"));
    }
    if config.session.ttl_secs.is_some() && config.session.sweep_interval_secs == 0 {
        errors.push(ValidationError::ZeroDuration("session.sweep_interval_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{RouteConfig, ServerConfig};

    fn base() -> BalancerConfig {
        let mut config = BalancerConfig::default();
        config.servers.push(ServerConfig::new("http://127.0.0.1:3001"));
        config.servers.push(ServerConfig::new("http://127.0.0.1:3002"));
        config
    }

    #[test]
    fn test_valid_config() {
        let mut config = base();
        config.routes.push(RouteConfig::new("/api/*", vec![0, 1]));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_servers() {
        let errors = validate_config(&BalancerConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoServers]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = base();
        config.servers.push(ServerConfig::weighted("http://127.0.0.1:3001/", 0));
        config.servers.push(ServerConfig::new("https://secure.example"));
        config.routes.push(RouteConfig::new("api", vec![7]));
        config.health_check.interval_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateUrl {
            index: 2,
            url: "http://127.0.0.1:3001/".into()
        }));
        assert!(errors.contains(&ValidationError::ZeroWeight { index: 2 }));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidUrl { index: 3, .. })));
        assert!(errors.contains(&ValidationError::InvalidRoutePath { path: "api".into() }));
        assert!(errors.contains(&ValidationError::UnknownServer {
            path: "api".into(),
            server: 7,
            count: 4
        }));
        assert!(errors.contains(&ValidationError::ZeroDuration("health_check.interval_secs")));
    }

    #[test]
    fn test_malformed_url() {
        let mut config = BalancerConfig::default();
        config.servers.push(ServerConfig::new("not a url"));
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidUrl { index: 0, .. }));
    }
}
