use anyhow::Context;
use bias_engine::{AnalysisConfig, BiasEngine, RawTrade};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Analyze a JSON array of trades and print the report.
///
/// Usage: bias-engine <trades.json> [config.json]
fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let trades_path = args
        .next()
        .context("usage: bias-engine <trades.json> [config.json]")?;

    let config = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            serde_json::from_str::<AnalysisConfig>(&text)
                .with_context(|| format!("parsing config {}", path))?
        }
        None => AnalysisConfig::default(),
    };

    let text = std::fs::read_to_string(&trades_path)
        .with_context(|| format!("reading trades {}", trades_path))?;
    let raw: Vec<RawTrade> =
        serde_json::from_str(&text).with_context(|| format!("parsing trades {}", trades_path))?;
    info!("Loaded {} trade records from {}", raw.len(), trades_path);

    let report = BiasEngine::new(config).analyze(&raw)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
