//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → engine.rs: routing → health filter → affinity / selector
//!     → forward.rs: one bounded attempt against the chosen backend
//!     → Outcome (Served / Unavailable / Failed) → http::response envelope
//! ```
//!
//! # Design Decisions
//! - At most one backend attempt per request
//! - The connection counter is held by a guard for exactly the attempt
//! - Recording outcomes never changes them

pub mod engine;
pub mod forward;

pub use engine::{Decision, DispatchEngine, DispatchError, Dispatched, Outcome};
pub use forward::{BackendReply, ForwardError, Forwarder};
