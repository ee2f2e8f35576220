//! Revenge trading detector
//!
//! Signals:
//! - trades re-entered on a related asset shortly after a loss
//! - position size growing right after losses
//! - long runs of consecutive losses (the trader keeps pressing)

use super::{excess_ramp, ratio_or_zero, round_to, saturation, WeightedSignal};
use crate::config::RevengeTradingConfig;
use crate::types::{Signal, SignalValue, Trade};
use chrono::Duration;
use std::collections::HashMap;

pub const POST_LOSS_TRADE_COUNT: &str = "post_loss_trade_count";
pub const POST_LOSS_SIZE_INCREASE: &str = "post_loss_size_increase";
pub const LOSS_STREAK_CONTINUATION: &str = "loss_streak_continuation";

/// Separators between base and quote/contract in asset identifiers
const SYMBOL_SEPARATORS: [char; 4] = ['/', '-', '_', ':'];

pub fn extract(trades: &[Trade], config: &RevengeTradingConfig) -> Vec<WeightedSignal> {
    let window = Duration::minutes(config.post_loss_window_minutes);

    // 1. Quick re-entries after a loss on a related asset
    let post_loss = post_loss_trade_count(trades, window);
    let post_loss_triggered = post_loss > 0;
    let post_loss_trades = WeightedSignal {
        signal: Signal {
            key: POST_LOSS_TRADE_COUNT.to_string(),
            label: format!(
                "Trades opened within {} min of a loss on the same asset",
                config.post_loss_window_minutes
            ),
            value: SignalValue::Count(post_loss),
            threshold: Some(SignalValue::Count(0)),
            triggered: post_loss_triggered,
        },
        weight: config.post_loss_weight,
        intensity: saturation(post_loss, config.post_loss_saturation_count),
    };

    // 2. Size after a loss relative to the losing position
    let size_ratio = post_loss_size_ratio(trades);
    let size_threshold = config.size_increase_threshold;
    let size_triggered = size_ratio > size_threshold;
    let size_increase = WeightedSignal {
        signal: Signal {
            key: POST_LOSS_SIZE_INCREASE.to_string(),
            label: "Position size after a loss vs. the losing position".to_string(),
            value: SignalValue::Number(round_to(size_ratio, 3)),
            threshold: Some(SignalValue::Number(size_threshold)),
            triggered: size_triggered,
        },
        weight: config.size_increase_weight,
        intensity: excess_ramp(size_triggered, size_ratio - size_threshold, size_threshold),
    };

    // 3. Longest losing streak
    let streak = longest_loss_streak(trades);
    let streak_threshold = config.loss_streak_threshold;
    let streak_triggered = streak >= streak_threshold as u64;
    let loss_streak = WeightedSignal {
        signal: Signal {
            key: LOSS_STREAK_CONTINUATION.to_string(),
            label: "Longest run of consecutive losses".to_string(),
            value: SignalValue::Count(streak),
            threshold: Some(SignalValue::Count(streak_threshold as u64)),
            triggered: streak_triggered,
        },
        weight: config.loss_streak_weight,
        intensity: excess_ramp(
            streak_triggered,
            streak as f64 - streak_threshold as f64,
            streak_threshold as f64,
        ),
    };

    vec![post_loss_trades, size_increase, loss_streak]
}

/// Base symbol used to relate assets: "BTC/USD", "btc-perp" -> "BTC"
pub fn base_symbol(asset: &str) -> String {
    asset
        .split(SYMBOL_SEPARATORS)
        .next()
        .unwrap_or(asset)
        .trim()
        .to_uppercase()
}

/// Trades whose most recent related predecessor was a loss within `window`
pub fn post_loss_trade_count(trades: &[Trade], window: Duration) -> u64 {
    let mut last_related: HashMap<String, &Trade> = HashMap::new();
    let mut count = 0;

    for trade in trades {
        let base = base_symbol(&trade.asset);
        if let Some(previous) = last_related.get(&base) {
            if previous.is_loss() && trade.timestamp - previous.timestamp <= window {
                count += 1;
            }
        }
        last_related.insert(base, trade);
    }

    count
}

/// Mean of next.quantity / loss.quantity over losses that have a next trade
pub fn post_loss_size_ratio(trades: &[Trade]) -> f64 {
    let ratios: Vec<f64> = trades
        .windows(2)
        .filter(|pair| pair[0].is_loss())
        .map(|pair| ratio_or_zero(pair[1].quantity, pair[0].quantity))
        .collect();

    ratio_or_zero(ratios.iter().sum(), ratios.len() as f64)
}

/// Longest run of consecutive losing trades; flat trades end a run
pub fn longest_loss_streak(trades: &[Trade]) -> u64 {
    let mut longest = 0;
    let mut current = 0;

    for trade in trades {
        if trade.is_loss() {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }

    longest
}
