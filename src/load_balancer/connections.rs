//! Per-backend in-flight request accounting.
//!
//! # Responsibilities
//! - Count forwarded requests that have not completed, per backend url
//! - Feed the connection-aware selectors
//! - Guarantee the count drops again on every exit path (RAII guard)

use dashmap::DashMap;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use crate::load_balancer::backend::Backend;
use crate::observability::metrics;

/// Live in-flight counts keyed by backend url.
#[derive(Debug, Default)]
pub struct ConnectionCounters {
    inner: DashMap<String, usize>,
}

impl ConnectionCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `url` has an entry, starting at zero.
    pub fn register(&self, url: &str) {
        if !self.inner.contains_key(url) {
            self.inner.entry(url.to_string()).or_insert(0);
        }
    }

    /// Current count for `url`; unseen backends count as zero.
    pub fn get(&self, url: &str) -> usize {
        self.inner.get(url).map(|count| *count).unwrap_or(0)
    }

    /// Record a request dispatched to `url`.
    pub fn increment(&self, url: &str) {
        let mut count = self.inner.entry(url.to_string()).or_insert(0);
        *count += 1;
        metrics::record_active_connections(url, *count);
    }

    /// Record a completed request. Never goes below zero.
    pub fn decrement(&self, url: &str) {
        let mut count = self.inner.entry(url.to_string()).or_insert(0);
        *count = count.saturating_sub(1);
        metrics::record_active_connections(url, *count);
    }

    /// Increment now and hand back a guard that decrements on drop.
    pub fn acquire(self: &Arc<Self>, backend: &Arc<Backend>) -> ConnectionGuard {
        self.increment(&backend.url);
        ConnectionGuard {
            backend: backend.clone(),
            counters: self.clone(),
        }
    }

    /// Copy of all counts.
    pub fn snapshot(&self) -> HashMap<String, usize> {
        self.inner
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

/// A RAII guard that holds one in-flight slot on a backend.
#[derive(Debug)]
pub struct ConnectionGuard {
    backend: Arc<Backend>,
    counters: Arc<ConnectionCounters>,
}

impl ConnectionGuard {
    pub fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }
}

impl Deref for ConnectionGuard {
    type Target = Backend;
    fn deref(&self) -> &Self::Target {
        &self.backend
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.counters.decrement(&self.backend.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_clamps_at_zero() {
        let counters = ConnectionCounters::new();
        counters.decrement("http://a");
        assert_eq!(counters.get("http://a"), 0);

        counters.increment("http://a");
        counters.decrement("http://a");
        counters.decrement("http://a");
        assert_eq!(counters.get("http://a"), 0);
    }

    #[test]
    fn test_register_keeps_existing_count() {
        let counters = ConnectionCounters::new();
        counters.increment("http://a");
        counters.register("http://a");
        counters.register("http://b");
        assert_eq!(counters.get("http://a"), 1);
        assert_eq!(counters.snapshot().get("http://b"), Some(&0));
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let counters = Arc::new(ConnectionCounters::new());
        let backend = Arc::new(Backend::new("http://127.0.0.1:3001", 1).unwrap());

        let first = counters.acquire(&backend);
        let second = counters.acquire(&backend);
        assert_eq!(counters.get(&backend.url), 2);
        assert_eq!(first.url, backend.url);

        drop(first);
        assert_eq!(counters.get(&backend.url), 1);
        drop(second);
        assert_eq!(counters.get(&backend.url), 0);
    }
}
