//! Session affinity subsystem.
//!
//! # Data Flow
//! ```text
//! Request Cookie header
//!     → cookie.rs (extract lb-session-id)
//!     → session.rs (token → backend url)
//!     → backend still eligible? use it
//!     → otherwise: selector picks, new token recorded, Set-Cookie emitted
//!
//! Optional (eviction.rs):
//!     periodic sweep of sessions older than the configured TTL
//! ```
//!
//! # Design Decisions
//! - Tokens are 128 random bits from the OS RNG
//! - Affinity never routes to a backend outside the healthy, eligible set
//! - No expiry unless explicitly configured

pub mod cookie;
pub mod eviction;
pub mod session;

pub use cookie::SESSION_COOKIE;
pub use eviction::SessionSweeper;
pub use session::{Affinity, Session, SessionManager};
