use axum::{extract::State, Json};
use serde::Serialize;

use super::AdminState;
use crate::health::HealthState;
use crate::observability::StatsSnapshot;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub algorithm: &'static str,
    pub sticky_sessions: bool,
    pub active_sessions: usize,
    pub healthy_backends: usize,
    pub total_backends: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendStatus {
    pub url: String,
    pub weight: u32,
    pub health: &'static str,
    pub active_connections: usize,
    pub requests: u64,
    pub errors: u64,
}

fn health_label(state: HealthState) -> &'static str {
    match state {
        HealthState::Unknown => "unknown",
        HealthState::Healthy => "healthy",
        HealthState::Unhealthy => "unhealthy",
    }
}

/// Same document the dashboard feed used to push.
pub async fn get_stats(State(state): State<AdminState>) -> Json<StatsSnapshot> {
    Json(state.engine.stats().snapshot())
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let engine = &state.engine;
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        algorithm: engine.selector().algorithm().as_str(),
        sticky_sessions: engine.sessions().is_some(),
        active_sessions: engine.sessions().map_or(0, |s| s.len()),
        healthy_backends: engine.health().filter_healthy(engine.pool().all_backends()).len(),
        total_backends: engine.pool().len(),
    })
}

pub async fn get_backends(State(state): State<AdminState>) -> Json<Vec<BackendStatus>> {
    let engine = &state.engine;
    let statuses = engine
        .pool()
        .all_backends()
        .iter()
        .map(|backend| {
            let stats = engine.stats().server(&backend.url);
            BackendStatus {
                url: backend.url.clone(),
                weight: backend.weight,
                health: health_label(engine.health().state(&backend.url)),
                active_connections: engine.connections().get(&backend.url),
                requests: stats.requests,
                errors: stats.errors,
            }
        })
        .collect();

    Json(statuses)
}
