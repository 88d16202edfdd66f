//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (ordered route scan)
//!     → matcher.rs (anchored wildcard match)
//!     → Return: matched route's backends, or every backend
//!
//! Route Compilation (at startup):
//!     RouteConfig[] (already ordered most-specific first)
//!     → compile patterns into literal segments
//!     → resolve server indices to backends
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same route
//! - First match wins

pub mod matcher;
pub mod router;

pub use matcher::PathPattern;
pub use router::{Route, RouteMatch, RouteTable};
