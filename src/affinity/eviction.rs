//! Opt-in session expiry.
//!
//! Sessions live forever unless `session.ttl_secs` is set, in which case
//! this sweeper drops those created more than `ttl` ago.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::affinity::session::SessionManager;
use crate::config::SessionConfig;

pub struct SessionSweeper {
    sessions: Arc<SessionManager>,
    ttl: Duration,
    interval: Duration,
}

impl SessionSweeper {
    /// A sweeper for `config`, or `None` when no TTL is configured.
    pub fn from_config(sessions: Arc<SessionManager>, config: &SessionConfig) -> Option<Self> {
        let ttl = Duration::from_secs(config.ttl_secs?);
        Some(Self {
            sessions,
            ttl,
            interval: Duration::from_secs(config.sweep_interval_secs),
        })
    }

    /// One pass over the session map.
    pub fn sweep(&self) -> usize {
        let evicted = self.sessions.evict_older_than(self.ttl);
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.sessions.len(), "Expired sessions evicted");
        }
        evicted
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            ttl_secs = self.ttl.as_secs(),
            interval_secs = self.interval.as_secs(),
            "Session sweeper starting"
        );

        let mut ticker = time::interval(self.interval);
        // Skip the immediate first tick; nothing can have expired yet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Session sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
