//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend origin server
//! - Carry the identity (url) and weight used by the selectors
//!
//! Backends are immutable after load. Live state (health, in-flight counts)
//! is held by the registries keyed on `Backend::url`.

use crate::config::ServerConfig;
use url::Url;

/// A single backend server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    /// Identity of the backend: the configured url without trailing '/'.
    pub url: String,
    /// Parsed form of `url`.
    pub base_url: Url,
    /// Relative share for weighted policies. Always at least 1.
    pub weight: u32,
}

impl Backend {
    /// Create a new backend from a base url.
    pub fn new(url: &str, weight: u32) -> Result<Self, url::ParseError> {
        let trimmed = url.trim_end_matches('/');
        let base_url = Url::parse(trimmed)?;
        Ok(Self {
            url: trimmed.to_string(),
            base_url,
            weight: weight.max(1),
        })
    }

    /// Build the absolute target for a request path (which may carry a query).
    pub fn target(&self, path_and_query: &str) -> String {
        format!("{}{}", self.url, path_and_query)
    }
}

impl TryFrom<&ServerConfig> for Backend {
    type Error = url::ParseError;

    fn try_from(config: &ServerConfig) -> Result<Self, Self::Error> {
        Backend::new(&config.url, config.weight)
    }
}
