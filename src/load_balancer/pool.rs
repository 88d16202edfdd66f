//! Backend pool management.
//!
//! # Responsibilities
//! - Build the backend list from configuration, in configured order
//! - Resolve route indices to backends
//! - Provide the full list for health checking and the no-route default

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::load_balancer::backend::Backend;

/// The ordered, immutable list of configured backends.
#[derive(Debug, Clone, Default)]
pub struct BackendPool {
    backends: Vec<Arc<Backend>>,
}

impl BackendPool {
    /// Create a pool from configuration.
    pub fn new(configs: &[ServerConfig]) -> Result<Self, url::ParseError> {
        let backends = configs
            .iter()
            .map(|config| Backend::try_from(config).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = backends.len(), "Backend pool built");
        Ok(Self { backends })
    }

    pub fn from_backends(backends: Vec<Arc<Backend>>) -> Self {
        Self { backends }
    }

    /// Backend at a configuration index.
    pub fn get(&self, index: usize) -> Option<&Arc<Backend>> {
        self.backends.get(index)
    }

    /// Backend with the given identity.
    pub fn find(&self, url: &str) -> Option<&Arc<Backend>> {
        self.backends.iter().find(|b| b.url == url)
    }

    /// Return a list of all backends (for health checking).
    pub fn all_backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
