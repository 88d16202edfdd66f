//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Startup, then periodic timer
//!     → Probe each backend concurrently (bounded by timeout)
//!     → Update state.rs
//!     → Publish healthy/dead lists to stats
//!
//! Registry (state.rs):
//!     healthy set / dead set, read by every request
//! ```
//!
//! # Design Decisions
//! - A single probe decides: no thresholds, no retries inside a cycle
//! - Forwarding failures do not feed back into health
//! - Health state is per-backend, not per-route

pub mod active;
pub mod state;

pub use active::{CycleReport, HealthMonitor, ProbeError};
pub use state::{HealthRegistry, HealthState, Transition};
