//! Backend health registry.
//!
//! # States
//! - Unknown: not probed yet (excluded from selection)
//! - Healthy: last probe succeeded, receives traffic
//! - Unhealthy: last probe failed, excluded from selection
//!
//! # State Transitions
//! ```text
//! Unknown/Unhealthy → Healthy: probe succeeds
//! Unknown/Healthy → Unhealthy: probe fails
//! ```
//!
//! # Design Decisions
//! - Only the probe cycle writes; everything else reads
//! - Transitions are reported so callers can log edges, not levels
//! - Identity is the backend url

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::load_balancer::Backend;

/// Health State enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Unknown,
    Healthy,
    Unhealthy,
}

/// What a probe result did to a backend's membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Entered the healthy set.
    Recovered,
    /// Left the healthy set.
    WentDown,
    /// No change in healthy-set membership.
    Unchanged,
}

#[derive(Debug, Default)]
struct HealthSets {
    healthy: HashSet<String>,
    dead: HashSet<String>,
}

/// Partition of backends into healthy and dead sets.
#[derive(Debug, Default)]
pub struct HealthRegistry {
    sets: RwLock<HealthSets>,
}

impl HealthRegistry {
    /// An empty registry: no backend confirmed healthy yet.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HealthSets> {
        self.sets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HealthSets> {
        self.sets.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a successful probe.
    pub fn mark_healthy(&self, url: &str) -> Transition {
        let mut sets = self.write();
        sets.dead.remove(url);
        if sets.healthy.insert(url.to_string()) {
            Transition::Recovered
        } else {
            Transition::Unchanged
        }
    }

    /// Record a failed probe.
    pub fn mark_dead(&self, url: &str) -> Transition {
        let mut sets = self.write();
        sets.dead.insert(url.to_string());
        if sets.healthy.remove(url) {
            Transition::WentDown
        } else {
            Transition::Unchanged
        }
    }

    pub fn is_healthy(&self, url: &str) -> bool {
        self.read().healthy.contains(url)
    }

    pub fn state(&self, url: &str) -> HealthState {
        let sets = self.read();
        if sets.healthy.contains(url) {
            HealthState::Healthy
        } else if sets.dead.contains(url) {
            HealthState::Unhealthy
        } else {
            HealthState::Unknown
        }
    }

    /// The healthy members of `backends`, in their original order.
    pub fn filter_healthy(&self, backends: &[Arc<Backend>]) -> Vec<Arc<Backend>> {
        let sets = self.read();
        backends
            .iter()
            .filter(|b| sets.healthy.contains(&b.url))
            .cloned()
            .collect()
    }

    pub fn healthy_count(&self) -> usize {
        self.read().healthy.len()
    }

    /// Sorted healthy urls.
    pub fn healthy_urls(&self) -> Vec<String> {
        let mut urls: Vec<_> = self.read().healthy.iter().cloned().collect();
        urls.sort();
        urls
    }

    /// Sorted dead urls.
    pub fn dead_urls(&self) -> Vec<String> {
        let mut urls: Vec<_> = self.read().dead.iter().cloned().collect();
        urls.sort();
        urls
    }
}
