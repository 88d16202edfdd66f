//! Session store mapping affinity tokens to backends.

use axum::http::{header::InvalidHeaderValue, HeaderMap, HeaderValue};
use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::affinity::cookie::{find_cookie, session_cookie, SESSION_COOKIE};
use crate::load_balancer::Backend;

/// Bytes of entropy in a session id (128 bits).
const SESSION_ID_BYTES: usize = 16;

/// A client's binding to a backend.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub backend_url: String,
    pub created_at: Instant,
}

/// The backend a request should go to, as decided by affinity.
#[derive(Debug, Clone)]
pub struct Affinity {
    pub backend: Arc<Backend>,
    pub session_id: String,
    /// The caller must send the session cookie to the client.
    pub is_new: bool,
}

/// Generate an unguessable session id: 128 bits from the OS RNG, hex encoded.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Owns every live session.
#[derive(Debug)]
pub struct SessionManager {
    sessions: DashMap<String, Session>,
    cookie_max_age: Duration,
}

impl SessionManager {
    pub fn new(cookie_max_age: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            cookie_max_age,
        }
    }

    /// The session token presented by the client, if any.
    pub fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        find_cookie(headers, SESSION_COOKIE)
    }

    /// The backend bound to the client's session, if it is among `eligible`.
    pub fn lookup(&self, headers: &HeaderMap, eligible: &[Arc<Backend>]) -> Option<Affinity> {
        let session_id = self.session_id(headers)?;
        let backend_url = self.sessions.get(&session_id)?.backend_url.clone();
        let backend = eligible.iter().find(|b| b.url == backend_url)?;

        Some(Affinity {
            backend: backend.clone(),
            session_id,
            is_new: false,
        })
    }

    /// Bind a fresh session to `backend` and return its id.
    pub fn record(&self, backend: &Backend) -> String {
        let id = generate_session_id();
        self.sessions.insert(
            id.clone(),
            Session {
                id: id.clone(),
                backend_url: backend.url.clone(),
                created_at: Instant::now(),
            },
        );
        tracing::debug!(backend = %backend.url, sessions = self.sessions.len(), "Session created");
        id
    }

    /// Honor an existing binding or create a new one with `pick`.
    ///
    /// A presented token whose backend is not in `eligible` is superseded:
    /// the client receives a new token and the old mapping is dropped, since
    /// the new cookie replaces it on the client. Returns `None` only when
    /// `pick` finds nothing.
    pub fn resolve<F>(&self, headers: &HeaderMap, eligible: &[Arc<Backend>], pick: F) -> Option<Affinity>
    where
        F: FnOnce(&[Arc<Backend>]) -> Option<Arc<Backend>>,
    {
        if let Some(existing) = self.lookup(headers, eligible) {
            return Some(existing);
        }

        let backend = pick(eligible)?;
        if let Some(stale) = self.session_id(headers) {
            if let Some((_, old)) = self.sessions.remove(&stale) {
                tracing::debug!(
                    previous = %old.backend_url,
                    backend = %backend.url,
                    "Session backend unavailable; rebinding client"
                );
            }
        }

        let session_id = self.record(&backend);
        Some(Affinity {
            backend,
            session_id,
            is_new: true,
        })
    }

    /// `Set-Cookie` value for `session_id`.
    pub fn cookie(&self, session_id: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        session_cookie(session_id, self.cookie_max_age)
    }

    pub fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    pub fn remove(&self, session_id: &str) -> Option<Session> {
        self.sessions.remove(session_id).map(|(_, session)| session)
    }

    /// Drop sessions created at least `ttl` ago. Returns how many were removed.
    pub fn evict_older_than(&self, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.created_at.elapsed() < ttl);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
