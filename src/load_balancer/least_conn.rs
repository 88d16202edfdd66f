//! Least Connections load balancing strategies.

use std::sync::Arc;

use crate::load_balancer::{backend::Backend, LoadBalancer, SelectionContext};

/// Least connections selector.
/// Selects the backend with the minimum number of in-flight requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeastConnections;

impl LoadBalancer for LeastConnections {
    fn next_server(&self, backends: &[Arc<Backend>], ctx: &SelectionContext<'_>) -> Option<Arc<Backend>> {
        // min_by_key keeps the first of equal minima, so ties go to input order.
        backends
            .iter()
            .min_by_key(|b| ctx.connections.get(&b.url))
            .cloned()
    }
}

/// Weighted least connections selector.
/// Selects the backend with the smallest `connections / weight`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedLeastConnections;

impl LoadBalancer for WeightedLeastConnections {
    fn next_server(&self, backends: &[Arc<Backend>], ctx: &SelectionContext<'_>) -> Option<Arc<Backend>> {
        let mut best: Option<(&Arc<Backend>, f64)> = None;

        for backend in backends {
            let ratio = ctx.connections.get(&backend.url) as f64 / backend.weight.max(1) as f64;
            // Strict comparison: earlier backends win ties.
            match best {
                Some((_, best_ratio)) if ratio >= best_ratio => {}
                _ => best = Some((backend, ratio)),
            }
        }

        best.map(|(backend, _)| backend.clone())
    }
}
