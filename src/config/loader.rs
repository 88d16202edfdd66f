//! Configuration loading from disk.

use std::cmp::Reverse;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{BalancerConfig, CompactConfig, RouteConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML or JSON file.
///
/// Files ending in `.json` are read as JSON, everything else as TOML.
/// Unknown keys are rejected in both formats.
pub fn load_config(path: &Path) -> Result<BalancerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let config = if is_json {
        parse_json(&content)?
    } else {
        toml::from_str(&content)?
    };

    prepare_config(config)
}

/// Parse a JSON document in either the sectioned or the compact layout.
///
/// A document using any compact-only top-level key is read as compact.
pub fn parse_json(content: &str) -> Result<BalancerConfig, ConfigError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let compact = value
        .as_object()
        .is_some_and(|map| CompactConfig::MARKER_KEYS.iter().any(|key| map.contains_key(*key)));

    if compact {
        let compact: CompactConfig = serde_json::from_value(value)?;
        Ok(compact.into())
    } else {
        Ok(serde_json::from_value(value)?)
    }
}

/// Validate an in-memory configuration and put its routes in match order.
pub fn prepare_config(mut config: BalancerConfig) -> Result<BalancerConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    sort_routes_by_specificity(&mut config.routes);
    Ok(config)
}

/// Order routes so longer patterns are tried first ("/api/v2" before "/api/*" before "/*").
///
/// Stable: patterns of equal length keep their file order.
pub fn sort_routes_by_specificity(routes: &mut [RouteConfig]) {
    routes.sort_by_key(|route| Reverse(route.path.len()));
}
