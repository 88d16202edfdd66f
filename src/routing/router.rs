//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes in match order
//! - Resolve a request path to its ordered candidate backends
//! - Fall back to every backend when nothing matches
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in table order; the first match wins, no merging
//! - The table never reorders routes; the config loader does that

use std::sync::Arc;

use crate::config::RouteConfig;
use crate::load_balancer::{Backend, BackendPool};
use crate::routing::matcher::PathPattern;

/// A compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: PathPattern,
    pub backends: Vec<Arc<Backend>>,
    pub strip_prefix: bool,
}

/// Result of a lookup: the candidates, and the route that produced them.
#[derive(Debug, Clone, Copy)]
pub struct RouteMatch<'a> {
    /// `None` when no route matched and every backend is eligible.
    pub route: Option<&'a Route>,
    pub backends: &'a [Arc<Backend>],
}

impl RouteMatch<'_> {
    /// The path to send upstream, after any prefix stripping the route asks for.
    pub fn forward_path(&self, path: &str) -> String {
        match self.route {
            Some(route) if route.strip_prefix => route.pattern.strip_prefix(path),
            _ => path.to_string(),
        }
    }

    /// Pattern of the matched route, for logging.
    pub fn pattern(&self) -> &str {
        self.route.map(|r| r.pattern.as_str()).unwrap_or("*")
    }
}

/// Ordered table of routes over a backend pool.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    all_backends: Vec<Arc<Backend>>,
}

impl RouteTable {
    /// Compile routes against the pool, keeping the given order.
    pub fn from_config(configs: &[RouteConfig], pool: &BackendPool) -> Self {
        let routes = configs
            .iter()
            .map(|config| {
                let backends = config
                    .servers
                    .iter()
                    .filter_map(|&index| {
                        let backend = pool.get(index).cloned();
                        if backend.is_none() {
                            tracing::warn!(route = %config.path, index, "Route refers to unknown server; skipped");
                        }
                        backend
                    })
                    .collect();
                Route {
                    pattern: PathPattern::new(config.path.clone()),
                    backends,
                    strip_prefix: config.strip_prefix,
                }
            })
            .collect();

        Self {
            routes,
            all_backends: pool.all_backends().to_vec(),
        }
    }

    /// Find the candidates for `path`.
    pub fn match_path(&self, path: &str) -> RouteMatch<'_> {
        match self.routes.iter().find(|route| route.pattern.matches(path)) {
            Some(route) => RouteMatch {
                route: Some(route),
                backends: &route.backends,
            },
            None => RouteMatch {
                route: None,
                backends: &self.all_backends,
            },
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
