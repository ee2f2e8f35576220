use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use analysis_api::{app, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Trading Bias Analysis API...");

    let settings = Settings::load()?;
    info!(
        "✓ Settings loaded (max upload {} bytes, {} trades/day threshold)",
        settings.max_upload_bytes, settings.analysis.overtrading.trades_per_day_threshold
    );

    let state = Arc::new(AppState::new(&settings));
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr()).await?;
    info!("🚀 Analysis API listening on {}", settings.bind_addr());

    axum::serve(listener, router).await?;

    Ok(())
}
