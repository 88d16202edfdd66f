//! Per-request dispatch.
//!
//! # Responsibilities
//! - Resolve route-eligible backends and intersect them with the healthy set
//! - Apply session affinity, falling back to the selector
//! - Forward once, holding a connection slot for the duration
//! - Report every outcome to the stats collector and metrics
//!
//! # Request States
//! ```text
//! route match → healthy filter ──empty──▶ Unavailable (503, nothing forwarded)
//!      │
//!      ▼
//! affinity / selector → forward ──ok──▶ Served (backend status)
//!                          └──err──▶ Failed (500)
//! ```

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderValue, Request};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::affinity::SessionManager;
use crate::config::BalancerConfig;
use crate::dispatch::forward::{BackendReply, ForwardError, Forwarder};
use crate::health::HealthRegistry;
use crate::http::request::{forward_headers, request_id};
use crate::load_balancer::{Backend, BackendPool, ConnectionCounters, Selector};
use crate::observability::{metrics, StatsCollector};
use crate::routing::RouteTable;

/// Why a request was not served.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("All servers are unavailable")]
    NoBackendAvailable,

    #[error("failed to read request body: {0}")]
    RequestBody(String),

    #[error(transparent)]
    Forward(#[from] ForwardError),
}

/// Where a request goes and what it needs on the way back.
#[derive(Debug, Clone)]
pub struct Decision {
    pub backend: Arc<Backend>,
    /// Path to request upstream, after any prefix stripping.
    pub forward_path: String,
    /// Pattern of the route that matched ("*" for the default).
    pub route: String,
    /// Set when a session was created for this request.
    pub new_session: Option<String>,
}

/// Terminal state of a dispatched request.
#[derive(Debug)]
pub enum Outcome {
    Served { backend: Arc<Backend>, reply: BackendReply },
    Unavailable,
    Failed { backend: Option<Arc<Backend>>, error: DispatchError },
}

/// Outcome plus the affinity cookie to attach, if any.
#[derive(Debug)]
pub struct Dispatched {
    pub outcome: Outcome,
    pub set_cookie: Option<HeaderValue>,
}

/// Decides and performs the forward for every inbound request.
pub struct DispatchEngine {
    pool: BackendPool,
    routes: RouteTable,
    health: Arc<HealthRegistry>,
    selector: Selector,
    sessions: Option<Arc<SessionManager>>,
    forwarder: Forwarder,
    stats: Arc<StatsCollector>,
    max_body_bytes: usize,
}

impl DispatchEngine {
    /// Build the engine and its registries from a validated configuration.
    pub fn from_config(config: &BalancerConfig, stats: Arc<StatsCollector>) -> Result<Self, url::ParseError> {
        let pool = BackendPool::new(&config.servers)?;
        let routes = RouteTable::from_config(&config.routes, &pool);
        let selector = Selector::new(config.algorithm, Arc::new(ConnectionCounters::new()));
        let sessions = config.enable_sticky_session.then(|| {
            Arc::new(SessionManager::new(std::time::Duration::from_secs(
                config.session.cookie_max_age_secs,
            )))
        });

        Ok(Self {
            pool,
            routes,
            health: Arc::new(HealthRegistry::new()),
            selector,
            sessions,
            forwarder: Forwarder::new(config.timeouts.forward()),
            stats,
            max_body_bytes: config.listener.max_body_bytes,
        })
    }

    pub fn pool(&self) -> &BackendPool {
        &self.pool
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn health(&self) -> &Arc<HealthRegistry> {
        &self.health
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn connections(&self) -> &Arc<ConnectionCounters> {
        self.selector.connections()
    }

    /// The session store, present when sticky sessions are enabled.
    pub fn sessions(&self) -> Option<&Arc<SessionManager>> {
        self.sessions.as_ref()
    }

    pub fn stats(&self) -> &Arc<StatsCollector> {
        &self.stats
    }

    /// Pick the backend for a request without doing any I/O.
    pub fn choose(&self, path: &str, headers: &HeaderMap) -> Result<Decision, DispatchError> {
        let matched = self.routes.match_path(path);
        let eligible = self.health.filter_healthy(matched.backends);
        if eligible.is_empty() {
            return Err(DispatchError::NoBackendAvailable);
        }

        let (backend, new_session) = match &self.sessions {
            Some(sessions) => {
                let affinity = sessions
                    .resolve(headers, &eligible, |candidates| self.selector.select(candidates))
                    .ok_or(DispatchError::NoBackendAvailable)?;
                let new_session = affinity.is_new.then_some(affinity.session_id);
                (affinity.backend, new_session)
            }
            None => {
                let backend = self
                    .selector
                    .select(&eligible)
                    .ok_or(DispatchError::NoBackendAvailable)?;
                (backend, None)
            }
        };

        Ok(Decision {
            backend,
            forward_path: matched.forward_path(path),
            route: matched.pattern().to_string(),
            new_session,
        })
    }

    /// Run a request through the full dispatch path.
    pub async fn dispatch(&self, request: Request<Body>, client: Option<SocketAddr>) -> Dispatched {
        let (parts, body) = request.into_parts();
        let request_id = request_id(&parts.headers).to_string();
        let path = parts.uri.path();

        let decision = match self.choose(path, &parts.headers) {
            Ok(decision) => decision,
            Err(error) => {
                tracing::warn!(request_id = %request_id, path = %path, "No backend available");
                return Dispatched {
                    outcome: match error {
                        DispatchError::NoBackendAvailable => Outcome::Unavailable,
                        error => Outcome::Failed { backend: None, error },
                    },
                    set_cookie: None,
                };
            }
        };

        let set_cookie = decision.new_session.as_deref().and_then(|id| {
            self.sessions
                .as_ref()
                .and_then(|sessions| sessions.cookie(id).ok())
        });

        tracing::debug!(
            request_id = %request_id,
            method = %parts.method,
            path = %path,
            route = %decision.route,
            backend = %decision.backend.url,
            new_session = decision.new_session.is_some(),
            "Dispatching request"
        );

        let body = match axum::body::to_bytes(body, self.max_body_bytes).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Failed to read request body");
                return Dispatched {
                    outcome: Outcome::Failed {
                        backend: Some(decision.backend),
                        error: DispatchError::RequestBody(e.to_string()),
                    },
                    set_cookie,
                };
            }
        };

        let path_and_query = match parts.uri.query() {
            Some(query) => format!("{}?{}", decision.forward_path, query),
            None => decision.forward_path.clone(),
        };
        let headers = forward_headers(&parts.headers, client);

        let result = self
            .forward(&decision.backend, parts.method.clone(), headers, &path_and_query, body)
            .await;

        let outcome = match result {
            Ok(reply) => {
                tracing::info!(
                    request_id = %request_id,
                    backend = %decision.backend.url,
                    status = %reply.status,
                    "Request served"
                );
                Outcome::Served {
                    backend: decision.backend,
                    reply,
                }
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    backend = %decision.backend.url,
                    error = %e,
                    "Upstream error"
                );
                Outcome::Failed {
                    backend: Some(decision.backend),
                    error: e.into(),
                }
            }
        };

        Dispatched { outcome, set_cookie }
    }

    /// One accounted forward attempt: the counter is held exactly as long as the attempt.
    async fn forward(
        &self,
        backend: &Arc<Backend>,
        method: axum::http::Method,
        headers: HeaderMap,
        path_and_query: &str,
        body: Bytes,
    ) -> Result<BackendReply, ForwardError> {
        let start = Instant::now();
        self.stats.record_request(&backend.url);

        let guard = self.connections().acquire(backend);
        let result = self
            .forwarder
            .forward(backend, method, headers, path_and_query, body)
            .await;
        drop(guard);

        match &result {
            Ok(reply) => metrics::record_request(&backend.url, reply.status.as_u16(), start),
            Err(e) => {
                let status = match e {
                    ForwardError::Status(status) => status.as_u16(),
                    _ => 502,
                };
                metrics::record_request(&backend.url, status, start);
                metrics::record_backend_error(&backend.url);
                self.stats.record_error(&backend.url);
            }
        }
        result
    }
}
