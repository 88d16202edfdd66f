//! Policy-driven backend selection.

use std::sync::Arc;

use crate::config::Algorithm;
use crate::load_balancer::{
    backend::Backend,
    connections::ConnectionCounters,
    least_conn::{LeastConnections, WeightedLeastConnections},
    round_robin::{RotationCursor, RoundRobin, WeightedRoundRobin},
    LoadBalancer, SelectionContext,
};

static ROUND_ROBIN: RoundRobin = RoundRobin;
static WEIGHTED_ROUND_ROBIN: WeightedRoundRobin = WeightedRoundRobin;
static LEAST_CONNECTIONS: LeastConnections = LeastConnections;
static WEIGHTED_LEAST_CONNECTIONS: WeightedLeastConnections = WeightedLeastConnections;

/// The strategy implementing `algorithm`.
pub fn strategy(algorithm: Algorithm) -> &'static dyn LoadBalancer {
    match algorithm {
        Algorithm::RoundRobin => &ROUND_ROBIN,
        Algorithm::WeightedRoundRobin => &WEIGHTED_ROUND_ROBIN,
        Algorithm::LeastConnections => &LEAST_CONNECTIONS,
        Algorithm::WeightedLeastConnections => &WEIGHTED_LEAST_CONNECTIONS,
    }
}

/// Picks one backend per request according to the configured algorithm.
///
/// Owns the rotation cursor and shares the connection counters with the
/// dispatch engine, which increments and decrements them around forwards.
#[derive(Debug)]
pub struct Selector {
    algorithm: Algorithm,
    cursor: RotationCursor,
    connections: Arc<ConnectionCounters>,
}

impl Selector {
    pub fn new(algorithm: Algorithm, connections: Arc<ConnectionCounters>) -> Self {
        Self {
            algorithm,
            cursor: RotationCursor::new(),
            connections,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn connections(&self) -> &Arc<ConnectionCounters> {
        &self.connections
    }

    /// Select with the configured algorithm.
    pub fn select(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        self.select_with(backends, self.algorithm)
    }

    /// Select with an explicit algorithm, sharing this selector's cursor and counters.
    pub fn select_with(&self, backends: &[Arc<Backend>], algorithm: Algorithm) -> Option<Arc<Backend>> {
        for backend in backends {
            self.connections.register(&backend.url);
        }

        let ctx = SelectionContext {
            cursor: &self.cursor,
            connections: &self.connections,
        };
        let chosen = strategy(algorithm).next_server(backends, &ctx);

        if let Some(backend) = &chosen {
            tracing::trace!(
                algorithm = %algorithm,
                candidates = backends.len(),
                backend = %backend.url,
                "Backend selected"
            );
        }
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backends(urls: &[(&str, u32)]) -> Vec<Arc<Backend>> {
        urls.iter()
            .map(|(url, weight)| Arc::new(Backend::new(url, *weight).unwrap()))
            .collect()
    }

    #[test]
    fn test_registers_every_candidate() {
        let connections = Arc::new(ConnectionCounters::new());
        let selector = Selector::new(Algorithm::RoundRobin, connections.clone());
        let pool = backends(&[("http://a", 1), ("http://b", 1)]);

        selector.select(&pool);

        let snapshot = connections.snapshot();
        assert_eq!(snapshot.get("http://a"), Some(&0));
        assert_eq!(snapshot.get("http://b"), Some(&0));
    }

    #[test]
    fn test_empty_returns_none() {
        for algorithm in [
            Algorithm::RoundRobin,
            Algorithm::WeightedRoundRobin,
            Algorithm::LeastConnections,
            Algorithm::WeightedLeastConnections,
        ] {
            let selector = Selector::new(algorithm, Arc::new(ConnectionCounters::new()));
            assert!(selector.select(&[]).is_none(), "{algorithm} should yield none");
        }
    }

    #[test]
    fn test_round_robin_visits_each_once() {
        let selector = Selector::new(Algorithm::RoundRobin, Arc::new(ConnectionCounters::new()));
        let pool = backends(&[("http://a", 1), ("http://b", 1), ("http://c", 1), ("http://d", 1)]);

        let picks: Vec<_> = (0..pool.len())
            .map(|_| selector.select(&pool).unwrap().url.clone())
            .collect();
        let expected: Vec<_> = pool.iter().map(|b| b.url.clone()).collect();
        assert_eq!(picks, expected);
    }

    #[test]
    fn test_least_connections_follows_counters() {
        let connections = Arc::new(ConnectionCounters::new());
        let selector = Selector::new(Algorithm::LeastConnections, connections.clone());
        let pool = backends(&[("http://a", 1), ("http://b", 1)]);

        let first = selector.select(&pool).unwrap();
        assert_eq!(first.url, "http://a");

        let _guard = connections.acquire(&first);
        assert_eq!(selector.select(&pool).unwrap().url, "http://b");
    }
}
