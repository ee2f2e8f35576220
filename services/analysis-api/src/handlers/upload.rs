//! Upload endpoints - file and manual trade entry

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use bias_engine::RawTrade;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::ApiError,
    ingest::{self, UploadFormat},
    observability::{metrics, Logger},
    AppState,
};

const MANUAL_FILENAME: &str = "manual_entry";

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub format: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ManualUploadRequest {
    pub session_id: Option<String>,
    pub trades: Vec<RawTrade>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    pub trade_count: usize,
    pub filename: Option<String>,
}

/// POST /upload?format=csv|json&filename=... - body is the raw file
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    let result = parse_and_check(&query, &body);
    let trades = match result {
        Ok(trades) => trades,
        Err(e) => {
            state.metrics.increment(metrics::UPLOAD_REJECTED, 1).await;
            return Err(e);
        }
    };

    let session_id = uuid::Uuid::new_v4().to_string();
    let filename = query.filename.unwrap_or_else(|| "upload".to_string());
    store_trades(&state, &session_id, &filename, trades).await
}

/// POST /upload/manual - create a session or replace its trades
pub async fn upload_manual(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ManualUploadRequest>,
) -> Result<Json<UploadResponse>, ApiError> {
    if req.trades.is_empty() {
        state.metrics.increment(metrics::UPLOAD_REJECTED, 1).await;
        return Err(ApiError::Ingest(ingest::IngestError::NoTrades));
    }
    if let Err(e) = bias_engine::validate_trades(&req.trades) {
        state.metrics.increment(metrics::UPLOAD_REJECTED, 1).await;
        return Err(e.into());
    }

    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    store_trades(&state, &session_id, MANUAL_FILENAME, req.trades).await
}

/// Parse the body and validate it up front so the user sees one error early
fn parse_and_check(query: &UploadQuery, body: &[u8]) -> Result<Vec<RawTrade>, ApiError> {
    let format = UploadFormat::detect(query.format.as_deref(), query.filename.as_deref())?;
    let trades = ingest::parse_upload(format, body)?;
    bias_engine::validate_trades(&trades)?;
    Ok(trades)
}

async fn store_trades(
    state: &AppState,
    session_id: &str,
    filename: &str,
    trades: Vec<RawTrade>,
) -> Result<Json<UploadResponse>, ApiError> {
    let trade_count = trades.len();
    state.sessions.put_trades(session_id, filename, trades).await;

    state.metrics.increment(metrics::UPLOADS, 1).await;
    state
        .metrics
        .increment(metrics::TRADES_INGESTED, trade_count as u64)
        .await;
    state
        .metrics
        .gauge(metrics::SESSIONS_ACTIVE, state.sessions.len().await as f64)
        .await;
    Logger::session_event(session_id, "upload", trade_count);

    Ok(Json(UploadResponse {
        session_id: session_id.to_string(),
        trade_count,
        filename: Some(filename.to_string()),
    }))
}
