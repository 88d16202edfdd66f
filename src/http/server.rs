//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID)
//! - Answer favicon requests outside the dispatch path
//! - Hand every other request to the dispatch engine
//! - Run the health monitor and session sweeper alongside the listener

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::affinity::SessionSweeper;
use crate::config::BalancerConfig;
use crate::dispatch::DispatchEngine;
use crate::health::HealthMonitor;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::StatsCollector;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DispatchEngine>,
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    config: BalancerConfig,
    engine: Arc<DispatchEngine>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: BalancerConfig) -> Result<Self, url::ParseError> {
        let stats = Arc::new(StatsCollector::new(config.algorithm));
        let engine = Arc::new(DispatchEngine::from_config(&config, stats)?);
        Ok(Self::with_engine(config, engine))
    }

    /// Create a server around an existing engine.
    pub fn with_engine(config: BalancerConfig, engine: Arc<DispatchEngine>) -> Self {
        let state = AppState {
            engine: engine.clone(),
        };
        let router = Self::build_router(state);
        Self {
            router,
            config,
            engine,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/favicon.ico", any(favicon))
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The router, for serving or for driving with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn engine(&self) -> &Arc<DispatchEngine> {
        &self.engine
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener until shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let monitor = HealthMonitor::new(
            self.engine.pool().all_backends().to_vec(),
            self.engine.health().clone(),
            self.engine.stats().clone(),
            self.config.health_check.clone(),
        );
        tokio::spawn(monitor.run(shutdown.resubscribe()));

        if let Some(sessions) = self.engine.sessions() {
            if let Some(sweeper) = SessionSweeper::from_config(sessions.clone(), &self.config.session) {
                tokio::spawn(sweeper.run(shutdown.resubscribe()));
            }
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Main proxy handler.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    state.engine.dispatch(request, client).await.into_response()
}
