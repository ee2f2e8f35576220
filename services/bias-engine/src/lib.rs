pub mod types;
pub mod config;
pub mod normalizers;
pub mod detectors;
pub mod scoring;
pub mod aggregators;

pub use types::*;
pub use config::AnalysisConfig;
pub use normalizers::validate_trades;

use detectors::WeightedSignal;
use std::thread;
use tracing::info;

/// Deterministic bias analysis over a trader's full history
#[derive(Debug, Clone, Default)]
pub struct BiasEngine {
    config: AnalysisConfig,
}

impl BiasEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Validate raw records, then analyze them
    pub fn analyze(&self, raw: &[RawTrade]) -> Result<Report> {
        let trades = validate_trades(raw)?;
        self.analyze_trades(trades)
    }

    /// Analyze already-validated trades
    pub fn analyze_trades(&self, mut trades: Vec<Trade>) -> Result<Report> {
        self.config.validate()?;
        if trades.is_empty() {
            return Err(AnalysisError::EmptyTradeSet.into());
        }
        normalizers::sort_chronologically(&mut trades);

        let extracted = self.extract_all(&trades)?;
        let biases: Vec<BiasResult> = extracted
            .into_iter()
            .map(|(kind, signals)| scoring::score_bias(kind, signals, &self.config.scoring))
            .collect();

        let risk_profile = aggregators::risk_profile(&biases, &self.config.scoring);
        let summary_stats = aggregators::summary_stats(&trades);
        let top_recommendation = aggregators::top_recommendation(&biases);
        let date_range = aggregators::date_range(&trades)?;

        info!(
            trades = trades.len(),
            risk_score = risk_profile.score,
            profile = ?risk_profile.profile,
            "analysis complete"
        );

        Ok(Report {
            trade_count: trades.len(),
            date_range,
            trades,
            biases,
            risk_profile,
            summary_stats,
            top_recommendation,
        })
    }

    /// Run every extractor on its own scoped thread and collect the
    /// results in report order
    fn extract_all(&self, trades: &[Trade]) -> Result<Vec<(BiasKind, Vec<WeightedSignal>)>> {
        let config = &self.config;
        thread::scope(|scope| {
            let handles: Vec<_> = BiasKind::ALL
                .iter()
                .map(|&kind| (kind, scope.spawn(move || detectors::extract(kind, trades, config))))
                .collect();

            handles
                .into_iter()
                .map(|(kind, handle)| {
                    handle
                        .join()
                        .map(|signals| (kind, signals))
                        .map_err(|_| {
                            EngineError::from(AnalysisError::Invariant(format!(
                                "{} extractor panicked",
                                kind.as_str()
                            )))
                        })
                })
                .collect()
        })
    }
}

/// Analyze raw trades with the default configuration
pub fn analyze(raw: &[RawTrade]) -> Result<Report> {
    BiasEngine::default().analyze(raw)
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_support::trade;

    #[test]
    fn test_empty_trade_set_is_rejected() {
        let err = BiasEngine::default().analyze_trades(Vec::new()).unwrap_err();
        assert_eq!(err, EngineError::Analysis(AnalysisError::EmptyTradeSet));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.overtrading.trades_per_day_weight = 0.9;
        let engine = BiasEngine::new(config);

        let err = engine
            .analyze_trades(vec![trade("2024-01-01T10:00:00Z", "SPY", 1.0, 1.0)])
            .unwrap_err();
        assert!(matches!(err, EngineError::Analysis(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_oversized_window_is_rejected_before_extraction() {
        let mut config = AnalysisConfig::default();
        config.overtrading.rapid_window_minutes = i64::MAX;
        let engine = BiasEngine::new(config);

        let err = engine
            .analyze_trades(vec![trade("2024-01-01T10:00:00Z", "SPY", 1.0, 1.0)])
            .unwrap_err();
        assert!(matches!(err, EngineError::Analysis(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_report_shape() {
        let trades = vec![
            trade("2024-01-03T10:00:00Z", "SPY", 1.0, -5.0),
            trade("2024-01-01T10:00:00Z", "SPY", 1.0, 10.0),
        ];
        let report = BiasEngine::default().analyze_trades(trades).unwrap();

        assert_eq!(report.trade_count, 2);
        let kinds: Vec<BiasKind> = report.biases.iter().map(|b| b.bias).collect();
        assert_eq!(kinds, BiasKind::ALL.to_vec());
        assert_eq!(report.date_range.from, report.trades[0].timestamp);
        assert!(report.trades[0].timestamp < report.trades[1].timestamp);
    }
}
