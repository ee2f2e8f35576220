//! Health check endpoints for load balancers and monitoring

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::AppState;

/// Basic liveness check - no work, always 200
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Detailed health with uptime, session count, counters and gauges
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let metrics = state.metrics.snapshot().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        sessions: state.sessions.len().await,
        metrics: HealthMetrics {
            uptime_secs: metrics.uptime_secs,
            counters: metrics.counters,
            gauges: metrics.gauges,
        },
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub sessions: usize,
    pub metrics: HealthMetrics,
}

#[derive(Serialize)]
pub struct HealthMetrics {
    pub uptime_secs: u64,
    pub counters: HashMap<String, u64>,
    pub gauges: HashMap<String, f64>,
}
