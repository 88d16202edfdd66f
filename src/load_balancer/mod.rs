//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Route matched → eligible backends
//!     → filtered to the healthy set
//!     → selector.rs applies the configured algorithm:
//!         - round_robin.rs (rotate, optionally weighted)
//!         - least_conn.rs (fewest in-flight, optionally per weight)
//!     → connections.rs guard held for the forward attempt
//! ```
//!
//! # Design Decisions
//! - Strategies are stateless; the selector owns the rotation cursor and
//!   the connection counters and lends them to the strategy per call
//! - One cursor per selector, shared by every route
//! - Ties always resolve to input order

pub mod backend;
pub mod connections;
pub mod least_conn;
pub mod pool;
pub mod round_robin;
pub mod selector;

use std::fmt::Debug;
use std::sync::Arc;

pub use backend::Backend;
pub use connections::{ConnectionCounters, ConnectionGuard};
pub use pool::BackendPool;
pub use round_robin::RotationCursor;
pub use selector::Selector;

/// Shared state a strategy may consult while choosing.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    pub cursor: &'a RotationCursor,
    pub connections: &'a ConnectionCounters,
}

/// A server selection strategy.
pub trait LoadBalancer: Send + Sync + Debug {
    /// Pick one of `backends`. Returns `None` only when `backends` is empty.
    fn next_server(&self, backends: &[Arc<Backend>], ctx: &SelectionContext<'_>) -> Option<Arc<Backend>>;
}
