//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Probe or forward to backend:
//!     → timeouts.rs (enforce deadline)
//!     → On expiry: single failure outcome for that attempt
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries and no circuit breaker: one attempt per request

pub mod timeouts;

pub use timeouts::{with_timeout, TimedOut};
