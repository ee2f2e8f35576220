//! Analysis endpoints - run the engine and serve stored reports

use axum::{
    extract::{Path, State},
    Json,
};
use bias_engine::{RawTrade, Report};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    error::ApiError,
    observability::{metrics, Logger},
    store::{ReportWrite, SessionReport},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub trades: Vec<RawTrade>,
}

/// POST /analyze/{session_id} - recompute from the stored trades
pub async fn analyze_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionReport>, ApiError> {
    let session = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::NotFound("Session not found.".to_string()))?;
    if session.trades.is_empty() {
        return Err(ApiError::BadRequest(
            "No trades loaded for this session.".to_string(),
        ));
    }

    let started = Instant::now();
    let report = run_analysis(&state, session.trades).await?;
    Logger::analysis_event(
        &session_id,
        report.risk_profile.score,
        started.elapsed().as_millis(),
    );

    let stored = SessionReport {
        session_id: session_id.clone(),
        generated_at: Utc::now(),
        report,
    };
    match state
        .sessions
        .put_report(&session_id, session.revision, stored.clone())
        .await
    {
        ReportWrite::Stored => Ok(Json(stored)),
        ReportWrite::Stale => Err(ApiError::Conflict(
            "Trades changed during analysis. Call POST /analyze again.".to_string(),
        )),
        ReportWrite::Missing => Err(ApiError::NotFound("Session not found.".to_string())),
    }
}

/// GET /report/{session_id} - last stored report
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionReport>, ApiError> {
    let session = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::NotFound("Session not found.".to_string()))?;

    session.report.map(Json).ok_or_else(|| {
        ApiError::NotFound(format!(
            "No report generated yet. Call POST /analyze/{} first.",
            session_id
        ))
    })
}

/// POST /analyze - analyze trades from the request body without a session
pub async fn analyze_stateless(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<Report>, ApiError> {
    run_analysis(&state, req.trades).await.map(Json)
}

/// Run the engine on the blocking pool and record the outcome
async fn run_analysis(state: &AppState, trades: Vec<RawTrade>) -> Result<Report, ApiError> {
    let engine = state.engine.clone();
    let started = Instant::now();

    let outcome = tokio::task::spawn_blocking(move || engine.analyze(&trades))
        .await
        .map_err(|e| ApiError::Internal(format!("analysis task failed: {}", e)))
        .and_then(|result| result.map_err(ApiError::from));

    match &outcome {
        Ok(_) => {
            state.metrics.increment(metrics::ANALYSES, 1).await;
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            state.metrics.gauge(metrics::ANALYSIS_DURATION_MS, elapsed_ms).await;
        }
        Err(_) => state.metrics.increment(metrics::ANALYSIS_FAILED, 1).await,
    }

    outcome
}
