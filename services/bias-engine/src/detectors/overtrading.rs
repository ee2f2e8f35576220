//! Overtrading detector
//!
//! Looks at trading cadence: how many trades per UTC calendar day, how often
//! the same asset is re-traded within minutes, and whether single days spike
//! far above the trader's own average.

use super::{excess_ramp, ratio_or_zero, round_to, saturation, WeightedSignal};
use crate::config::OvertradingConfig;
use crate::types::{Signal, SignalValue, Trade};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};

pub const TRADES_PER_DAY: &str = "trades_per_day";
pub const RAPID_SUCCESSION_COUNT: &str = "rapid_succession_count";
pub const MAX_TRADES_SINGLE_DAY: &str = "max_trades_single_day";

pub fn extract(trades: &[Trade], config: &OvertradingConfig) -> Vec<WeightedSignal> {
    let daily = daily_counts(trades);
    let mean_per_day = ratio_or_zero(trades.len() as f64, daily.len() as f64);
    let busiest_day = daily.values().copied().max().unwrap_or(0);
    let rapid = rapid_succession_count(trades, Duration::minutes(config.rapid_window_minutes));

    // 1. Mean trades per day
    let tpd_threshold = config.trades_per_day_threshold;
    let tpd_triggered = mean_per_day > tpd_threshold;
    let trades_per_day = WeightedSignal {
        signal: Signal {
            key: TRADES_PER_DAY.to_string(),
            label: "Average trades per day".to_string(),
            value: SignalValue::Number(round_to(mean_per_day, 2)),
            threshold: Some(SignalValue::Number(tpd_threshold)),
            triggered: tpd_triggered,
        },
        weight: config.trades_per_day_weight,
        intensity: excess_ramp(tpd_triggered, mean_per_day - tpd_threshold, tpd_threshold),
    };

    // 2. Same-asset re-entries inside the rapid window
    let rapid_triggered = rapid > 0;
    let rapid_succession = WeightedSignal {
        signal: Signal {
            key: RAPID_SUCCESSION_COUNT.to_string(),
            label: format!(
                "Same-asset trades within {} min of the previous one",
                config.rapid_window_minutes
            ),
            value: SignalValue::Count(rapid),
            threshold: Some(SignalValue::Count(0)),
            triggered: rapid_triggered,
        },
        weight: config.rapid_succession_weight,
        intensity: saturation(rapid, config.rapid_saturation_count),
    };

    // 3. Busiest day against the daily mean
    let spike_multiple = ratio_or_zero(busiest_day as f64, mean_per_day);
    let spike_threshold = config.max_day_multiple * mean_per_day;
    let spike_triggered = (busiest_day as f64) > spike_threshold;
    let max_single_day = WeightedSignal {
        signal: Signal {
            key: MAX_TRADES_SINGLE_DAY.to_string(),
            label: "Most trades in a single day".to_string(),
            value: SignalValue::Count(busiest_day),
            threshold: Some(SignalValue::Number(round_to(spike_threshold, 2))),
            triggered: spike_triggered,
        },
        weight: config.max_single_day_weight,
        intensity: excess_ramp(
            spike_triggered,
            spike_multiple - config.max_day_multiple,
            config.max_day_multiple,
        ),
    };

    vec![trades_per_day, rapid_succession, max_single_day]
}

/// Trades per UTC calendar day
pub fn daily_counts(trades: &[Trade]) -> BTreeMap<NaiveDate, u64> {
    let mut counts = BTreeMap::new();
    for trade in trades {
        *counts.entry(trade.timestamp.date_naive()).or_insert(0) += 1;
    }
    counts
}

/// Trades placed within `window` of the previous trade on the same asset
pub fn rapid_succession_count(trades: &[Trade], window: Duration) -> u64 {
    let mut last_seen: HashMap<&str, DateTime<Utc>> = HashMap::new();
    let mut count = 0;

    for trade in trades {
        if let Some(previous) = last_seen.insert(trade.asset.as_str(), trade.timestamp) {
            if trade.timestamp - previous <= window {
                count += 1;
            }
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::trade;

    #[test]
    fn test_one_trade_per_day_is_quiet() {
        let trades: Vec<Trade> = (1..=10)
            .map(|d| trade(&format!("2024-01-{:02}T14:00:00Z", d), "AAPL", 1.0, 10.0))
            .collect();
        let signals = extract(&trades, &OvertradingConfig::default());

        assert_eq!(signals[0].signal.value, SignalValue::Number(1.0));
        assert!(signals.iter().all(|s| !s.signal.triggered));
        assert!(signals.iter().all(|s| s.intensity == 0.0));
    }

    #[test]
    fn test_rapid_succession_is_per_asset() {
        let trades = vec![
            trade("2024-01-02T10:00:00Z", "AAPL", 1.0, 5.0),
            trade("2024-01-02T10:01:00Z", "MSFT", 1.0, 5.0),
            trade("2024-01-02T10:03:00Z", "AAPL", 1.0, 5.0),
            trade("2024-01-02T10:20:00Z", "AAPL", 1.0, 5.0),
            trade("2024-01-02T10:21:00Z", "MSFT", 1.0, 5.0),
        ];
        assert_eq!(rapid_succession_count(&trades, Duration::minutes(5)), 1);
    }

    #[test]
    fn test_first_rapid_reentry_scores_at_least_half() {
        let trades = vec![
            trade("2024-01-02T10:00:00Z", "AAPL", 1.0, 5.0),
            trade("2024-01-02T10:02:00Z", "AAPL", 1.0, 5.0),
        ];
        let signals = extract(&trades, &OvertradingConfig::default());
        let rapid = &signals[1];

        assert_eq!(rapid.signal.value, SignalValue::Count(1));
        assert!(rapid.signal.triggered);
        assert!(rapid.intensity >= 0.5);
    }

    #[test]
    fn test_single_day_spike() {
        // 1 trade on each of four days, then 12 on the fifth: mean 3.2/day
        let mut trades: Vec<Trade> = (1..=4)
            .map(|d| trade(&format!("2024-01-{:02}T09:00:00Z", d), "ETH", 1.0, 1.0))
            .collect();
        for h in 0..12 {
            trades.push(trade(&format!("2024-01-05T{:02}:30:00Z", h), "ETH", 1.0, 1.0));
        }
        let signals = extract(&trades, &OvertradingConfig::default());
        let spike = &signals[2];

        assert_eq!(spike.signal.key, MAX_TRADES_SINGLE_DAY);
        assert_eq!(spike.signal.value, SignalValue::Count(12));
        assert!(spike.signal.triggered);
        assert!(spike.intensity > 0.5);
        assert!(!signals[0].signal.triggered);
    }

    #[test]
    fn test_daily_counts_use_utc_dates() {
        let trades = vec![
            trade("2024-01-02T23:59:00Z", "BTC", 1.0, 1.0),
            trade("2024-01-03T00:01:00Z", "BTC", 1.0, 1.0),
        ];
        assert_eq!(daily_counts(&trades).len(), 2);
    }
}
