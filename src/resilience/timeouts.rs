//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap probe and forward calls with a deadline
//! - Report expiry as its own error, distinct from I/O failures
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - The wrapped future is dropped on expiry; no partial results

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// The deadline passed before the operation completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("timed out after {}ms", .0.as_millis())]
pub struct TimedOut(pub Duration);

/// Run `future` for at most `limit`.
pub async fn with_timeout<F>(limit: Duration, future: F) -> Result<F::Output, TimedOut>
where
    F: Future,
{
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| TimedOut(limit))
}
