//! Shutdown coordination for the balancer.
//!
//! One broadcast fans out to every long-running task: the client listener,
//! the admin listener, the health monitor and the session sweeper. Each task
//! drops its receiver on exit, so the receiver count tells startup when the
//! background work has actually stopped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, Instant};

const DRAIN_POLL: Duration = Duration::from_millis(25);

#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Broadcast the stop signal. Only the first call is logged.
    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::AcqRel) {
            tracing::info!(tasks = self.tx.receiver_count(), "Broadcasting shutdown");
        }
        let _ = self.tx.send(());
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    /// Tasks still holding a receiver.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Wait until every subscribed task has exited, up to `limit`.
    /// Returns `false` if some were still running at the deadline.
    pub async fn drained(&self, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        while self.receiver_count() > 0 {
            if Instant::now() >= deadline {
                return false;
            }
            time::sleep(DRAIN_POLL).await;
        }
        true
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
