//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch engine and health monitor produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!     → stats.rs (totals and health partition for the stats API)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//!     → admin stats API
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows from the inbound request to the backend
//! - Recording never changes a request's outcome

pub mod logging;
pub mod metrics;
pub mod stats;

pub use stats::{ServerStats, StatsCollector, StatsSnapshot};
