//! Read-only admin API.
//!
//! Served on its own listener so operators can inspect the balancer without
//! the request passing through dispatch.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::dispatch::DispatchEngine;

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub engine: Arc<DispatchEngine>,
    /// Bearer token required on every call when set.
    pub api_key: Option<String>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/api/stats", get(get_stats))
        .route("/admin/status", get(get_status))
        .route("/admin/backends", get(get_backends))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
