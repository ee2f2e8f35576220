pub mod error;
pub mod health;
pub mod ingest;
pub mod observability;
pub mod settings;
pub mod store;
pub mod handlers {
    pub mod analysis;
    pub mod upload;
}

use std::sync::Arc;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use bias_engine::BiasEngine;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use observability::{Logger, MetricsCollector};
pub use settings::Settings;
pub use store::{InMemorySessionStore, ReportWrite, SessionReport, SessionStore};

/// Application state shared across handlers
pub struct AppState {
    pub engine: BiasEngine,
    pub sessions: Arc<dyn SessionStore>,
    pub metrics: MetricsCollector,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self::with_store(settings, Arc::new(InMemorySessionStore::new()))
    }

    pub fn with_store(settings: &Settings, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            engine: BiasEngine::new(settings.analysis.clone()),
            sessions,
            metrics: MetricsCollector::new(),
            max_upload_bytes: settings.max_upload_bytes,
        }
    }
}

/// Build the API router
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/upload", post(handlers::upload::upload_file))
        .route("/upload/manual", post(handlers::upload::upload_manual))
        .route("/analyze", post(handlers::analysis::analyze_stateless))
        .route("/analyze/{session_id}", post(handlers::analysis::analyze_session))
        .route("/report/{session_id}", get(handlers::analysis::get_report))
        .route("/health", get(health::health))
        .route("/healthz", get(health::healthz))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
