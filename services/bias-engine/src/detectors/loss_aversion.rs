//! Loss aversion detector
//!
//! The trade log carries no entry time, so holding-period asymmetry cannot be
//! measured directly. P&L magnitude is used instead: a trader who lets losers
//! run and cuts winners short ends up with losses larger than wins.

use super::{excess_ramp, ratio_or_zero, round_to, WeightedSignal};
use crate::config::LossAversionConfig;
use crate::types::{Signal, SignalValue, Trade};

pub const AVG_WIN_SIZE: &str = "avg_win_size";
pub const AVG_LOSS_SIZE: &str = "avg_loss_size";
pub const LOSS_CUT_RATIO: &str = "loss_cut_ratio";
pub const WIN_LOSS_SIZE_RATIO: &str = "win_loss_size_ratio";

pub fn extract(trades: &[Trade], config: &LossAversionConfig) -> Vec<WeightedSignal> {
    let wins: Vec<f64> = trades.iter().filter(|t| t.is_win()).map(|t| t.profit_loss).collect();
    let losses: Vec<f64> = trades
        .iter()
        .filter(|t| t.is_loss())
        .map(|t| t.profit_loss.abs())
        .collect();

    let avg_win = mean(&wins);
    let avg_loss = mean(&losses);
    // Both ratios need winners and losers to mean anything
    let comparable = !wins.is_empty() && !losses.is_empty();

    // 1. Losers that grew past the typical winner
    let loss_cut_ratio = if comparable {
        let oversized = losses.iter().filter(|l| **l > avg_win).count();
        ratio_or_zero(oversized as f64, losses.len() as f64)
    } else {
        0.0
    };
    let cut_threshold = config.loss_cut_threshold;
    let cut_triggered = comparable && loss_cut_ratio > cut_threshold;
    let loss_cut = WeightedSignal {
        signal: Signal {
            key: LOSS_CUT_RATIO.to_string(),
            label: "Share of losses larger than the average win".to_string(),
            value: SignalValue::Number(round_to(loss_cut_ratio, 3)),
            threshold: Some(SignalValue::Number(cut_threshold)),
            triggered: cut_triggered,
        },
        weight: config.loss_cut_weight,
        intensity: excess_ramp(cut_triggered, loss_cut_ratio - cut_threshold, 1.0 - cut_threshold),
    };

    // 2. Average win relative to average loss
    let size_ratio = if comparable { ratio_or_zero(avg_win, avg_loss) } else { 0.0 };
    let ratio_threshold = config.size_ratio_threshold;
    let ratio_triggered = comparable && size_ratio < ratio_threshold;
    let win_loss_ratio = WeightedSignal {
        signal: Signal {
            key: WIN_LOSS_SIZE_RATIO.to_string(),
            label: "Average win / average loss".to_string(),
            value: SignalValue::Number(round_to(size_ratio, 3)),
            threshold: Some(SignalValue::Number(ratio_threshold)),
            triggered: ratio_triggered,
        },
        weight: config.size_ratio_weight,
        intensity: excess_ramp(ratio_triggered, ratio_threshold - size_ratio, ratio_threshold),
    };

    vec![
        WeightedSignal::informational(
            AVG_WIN_SIZE,
            "Average winning trade",
            SignalValue::Number(round_to(avg_win, 2)),
        ),
        WeightedSignal::informational(
            AVG_LOSS_SIZE,
            "Average losing trade (absolute)",
            SignalValue::Number(round_to(avg_loss, 2)),
        ),
        loss_cut,
        win_loss_ratio,
    ]
}

fn mean(values: &[f64]) -> f64 {
    ratio_or_zero(values.iter().sum(), values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::trade;

    fn by_key<'a>(signals: &'a [WeightedSignal], key: &str) -> &'a WeightedSignal {
        signals.iter().find(|s| s.signal.key == key).unwrap()
    }

    #[test]
    fn test_balanced_sizes_do_not_trigger() {
        let trades = vec![
            trade("2024-01-01T10:00:00Z", "SPY", 1.0, 100.0),
            trade("2024-01-02T10:00:00Z", "SPY", 1.0, -90.0),
            trade("2024-01-03T10:00:00Z", "SPY", 1.0, 110.0),
            trade("2024-01-04T10:00:00Z", "SPY", 1.0, -95.0),
        ];
        let signals = extract(&trades, &LossAversionConfig::default());

        assert_eq!(by_key(&signals, AVG_WIN_SIZE).signal.value, SignalValue::Number(105.0));
        assert_eq!(by_key(&signals, AVG_LOSS_SIZE).signal.value, SignalValue::Number(92.5));
        assert!(signals.iter().all(|s| !s.signal.triggered));
    }

    #[test]
    fn test_large_losses_trigger_both_signals() {
        let trades = vec![
            trade("2024-01-01T10:00:00Z", "SPY", 1.0, 50.0),
            trade("2024-01-02T10:00:00Z", "SPY", 1.0, -200.0),
            trade("2024-01-03T10:00:00Z", "SPY", 1.0, 40.0),
            trade("2024-01-04T10:00:00Z", "SPY", 1.0, -150.0),
            trade("2024-01-05T10:00:00Z", "SPY", 1.0, -30.0),
        ];
        let signals = extract(&trades, &LossAversionConfig::default());

        let cut = by_key(&signals, LOSS_CUT_RATIO);
        assert!(cut.signal.triggered);
        assert_eq!(cut.signal.value, SignalValue::Number(0.667));

        let ratio = by_key(&signals, WIN_LOSS_SIZE_RATIO);
        assert!(ratio.signal.triggered);
        assert!(ratio.intensity > 0.5);
    }

    #[test]
    fn test_one_sided_history_defaults_to_zero() {
        let trades = vec![
            trade("2024-01-01T10:00:00Z", "SPY", 1.0, -50.0),
            trade("2024-01-02T10:00:00Z", "SPY", 1.0, -20.0),
        ];
        let signals = extract(&trades, &LossAversionConfig::default());

        assert_eq!(by_key(&signals, WIN_LOSS_SIZE_RATIO).signal.value, SignalValue::Number(0.0));
        assert_eq!(by_key(&signals, LOSS_CUT_RATIO).signal.value, SignalValue::Number(0.0));
        assert!(signals.iter().all(|s| !s.signal.triggered));
    }
}
