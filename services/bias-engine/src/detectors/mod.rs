//! Signal extractors - one per bias
//!
//! Each detector reads the chronologically sorted trade slice and returns
//! its signals in display order, together with the weight and intensity
//! the scorer combines into a bias score.

pub mod loss_aversion;
pub mod overtrading;
pub mod revenge_trading;

use crate::config::AnalysisConfig;
use crate::types::{BiasKind, Signal, SignalValue, Trade};

/// A signal plus its contribution inputs
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSignal {
    pub signal: Signal,
    /// Share of the bias score this signal can claim (0 for informational)
    pub weight: f64,
    /// 0.0 - 1.0, how far past its threshold the signal is
    pub intensity: f64,
}

impl WeightedSignal {
    pub fn contribution(&self) -> f64 {
        self.weight * self.intensity
    }

    /// Signal shown for context only; never triggers, never scores
    pub fn informational(key: &str, label: &str, value: SignalValue) -> Self {
        Self {
            signal: Signal {
                key: key.to_string(),
                label: label.to_string(),
                value,
                threshold: None,
                triggered: false,
            },
            weight: 0.0,
            intensity: 0.0,
        }
    }
}

/// Run the extractor for one bias
pub fn extract(kind: BiasKind, trades: &[Trade], config: &AnalysisConfig) -> Vec<WeightedSignal> {
    match kind {
        BiasKind::Overtrading => overtrading::extract(trades, &config.overtrading),
        BiasKind::LossAversion => loss_aversion::extract(trades, &config.loss_aversion),
        BiasKind::RevengeTrading => revenge_trading::extract(trades, &config.revenge_trading),
    }
}

/// Intensity for a threshold signal: nothing below the threshold, half
/// weight on crossing it, full weight once the excess reaches `span`.
pub(crate) fn excess_ramp(triggered: bool, excess: f64, span: f64) -> f64 {
    if !triggered {
        return 0.0;
    }
    let fraction = if span > 0.0 { excess / span } else { 1.0 };
    0.5 + 0.5 * fraction.clamp(0.0, 1.0)
}

/// Intensity for a count signal: nothing at zero, at least half weight for
/// the first occurrence, full weight once `count` reaches `saturation`.
pub(crate) fn saturation(count: u64, saturation: u32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    if saturation == 0 {
        return 1.0;
    }
    0.5 + 0.5 * (count as f64 / saturation as f64).min(1.0)
}

/// `numerator / denominator`, or 0 when the denominator is zero
pub(crate) fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < f64::EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}

/// Round for display so serialized values stay stable and readable
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excess_ramp() {
        assert_eq!(excess_ramp(false, 10.0, 1.0), 0.0);
        assert_eq!(excess_ramp(true, 0.0, 5.0), 0.5);
        assert_eq!(excess_ramp(true, 2.5, 5.0), 0.75);
        assert_eq!(excess_ramp(true, 50.0, 5.0), 1.0);
    }

    #[test]
    fn test_saturation() {
        assert_eq!(saturation(0, 3), 0.0);
        assert!((saturation(1, 3) - 2.0 / 3.0).abs() < 1e-12);
        assert!((saturation(2, 3) - 5.0 / 6.0).abs() < 1e-12);
        assert_eq!(saturation(3, 3), 1.0);
        assert_eq!(saturation(7, 3), 1.0);
        assert_eq!(saturation(1, 0), 1.0);
    }

    #[test]
    fn test_ratio_or_zero() {
        assert_eq!(ratio_or_zero(5.0, 0.0), 0.0);
        assert_eq!(ratio_or_zero(5.0, 2.0), 2.5);
    }
}
