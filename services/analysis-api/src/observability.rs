//! Observability: in-process counters and structured session logging

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Counter and gauge collector surfaced on the health endpoint
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<RwLock<MetricsInner>>,
}

struct MetricsInner {
    counters: HashMap<String, u64>,
    gauges: HashMap<String, f64>,
    start_time: Instant,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsInner {
                counters: HashMap::new(),
                gauges: HashMap::new(),
                start_time: Instant::now(),
            })),
        }
    }

    /// Increment a counter
    pub async fn increment(&self, name: &str, value: u64) {
        let mut inner = self.inner.write().await;
        *inner.counters.entry(name.to_string()).or_insert(0) += value;
    }

    /// Set a gauge value
    pub async fn gauge(&self, name: &str, value: f64) {
        let mut inner = self.inner.write().await;
        inner.gauges.insert(name.to_string(), value);
    }

    pub async fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.read().await;
        MetricsSnapshot {
            counters: inner.counters.clone(),
            gauges: inner.gauges.clone(),
            uptime_secs: inner.start_time.elapsed().as_secs(),
        }
    }

    pub async fn get_counter(&self, name: &str) -> u64 {
        let inner = self.inner.read().await;
        inner.counters.get(name).copied().unwrap_or(0)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSnapshot {
    pub counters: HashMap<String, u64>,
    pub gauges: HashMap<String, f64>,
    pub uptime_secs: u64,
}

/// Structured log lines for session lifecycle events
pub struct Logger;

impl Logger {
    pub fn session_event(session_id: &str, action: &str, trade_count: usize) {
        tracing::info!(
            session_id = %session_id,
            action = %action,
            trade_count,
            "session_event"
        );
    }

    pub fn analysis_event(session_id: &str, risk_score: u8, elapsed_ms: u128) {
        tracing::info!(
            session_id = %session_id,
            risk_score,
            elapsed_ms = elapsed_ms as u64,
            "analysis_event"
        );
    }
}

/// Predefined metric names
pub mod metrics {
    // Ingest
    pub const UPLOADS: &str = "uploads_total";
    pub const TRADES_INGESTED: &str = "trades_ingested_total";
    pub const UPLOAD_REJECTED: &str = "upload_rejected_total";

    // Analysis
    pub const ANALYSES: &str = "analyses_total";
    pub const ANALYSIS_FAILED: &str = "analysis_failed_total";
    pub const ANALYSIS_DURATION_MS: &str = "analysis_duration_ms";

    // Sessions
    pub const SESSIONS_ACTIVE: &str = "sessions_active";
}
