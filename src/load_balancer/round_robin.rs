//! Round-robin load balancing strategies.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::{backend::Backend, LoadBalancer, SelectionContext};

/// Rotation cursor shared by the round-robin family.
///
/// Holds the last index handed out. It is never reset when the candidate
/// set changes between calls; the next index is always `(last + 1) % len`
/// for whatever `len` the current call has.
#[derive(Debug)]
pub struct RotationCursor {
    last: AtomicUsize,
}

impl RotationCursor {
    /// A fresh cursor; the first advance yields 0.
    pub fn new() -> Self {
        Self {
            last: AtomicUsize::new(usize::MAX),
        }
    }

    /// Move to the next position in a sequence of `len` items. `len` must be non-zero.
    pub fn advance(&self, len: usize) -> usize {
        let step = |last: usize| last.wrapping_add(1) % len;
        // The closure never returns None, so fetch_update cannot fail.
        match self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| Some(step(last)))
        {
            Ok(prev) | Err(prev) => step(prev),
        }
    }
}

impl Default for RotationCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Round-robin selector.
/// Rotates through the candidates in input order.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoundRobin;

impl LoadBalancer for RoundRobin {
    fn next_server(&self, backends: &[Arc<Backend>], ctx: &SelectionContext<'_>) -> Option<Arc<Backend>> {
        if backends.is_empty() {
            return None;
        }
        let index = ctx.cursor.advance(backends.len());
        Some(backends[index].clone())
    }
}

/// Weighted round-robin selector.
///
/// Behaves like round robin over a sequence where each backend is repeated
/// `weight` times back to back, without materializing that sequence.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedRoundRobin;

impl LoadBalancer for WeightedRoundRobin {
    fn next_server(&self, backends: &[Arc<Backend>], ctx: &SelectionContext<'_>) -> Option<Arc<Backend>> {
        if backends.is_empty() {
            return None;
        }

        let total: usize = backends.iter().map(|b| b.weight.max(1) as usize).sum();
        let mut slot = ctx.cursor.advance(total);

        for backend in backends {
            let weight = backend.weight.max(1) as usize;
            if slot < weight {
                return Some(backend.clone());
            }
            slot -= weight;
        }
        // Unreachable: slot < total.
        backends.last().cloned()
    }
}
