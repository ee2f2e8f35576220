//! Analysis configuration
//!
//! Every threshold, window and weight the detectors use lives here. The
//! defaults are starting points to be tuned against labeled data; callers
//! may override any subset through serde (unset fields keep their default).

use serde::{Deserialize, Serialize};

use crate::types::{AnalysisError, RiskProfileKind, Severity};

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Longest look-back window accepted for time-based signals (7 days)
pub const MAX_WINDOW_MINUTES: i64 = 7 * 24 * 60;

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub overtrading: OvertradingConfig,
    pub loss_aversion: LossAversionConfig,
    pub revenge_trading: RevengeTradingConfig,
    pub scoring: ScoringConfig,
}

impl AnalysisConfig {
    /// Reject configurations that would make scores meaningless
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let o = &self.overtrading;
        check_weights(
            "overtrading",
            &[o.trades_per_day_weight, o.rapid_succession_weight, o.max_single_day_weight],
        )?;
        check_positive("overtrading.trades_per_day_threshold", o.trades_per_day_threshold)?;
        check_window("overtrading.rapid_window_minutes", o.rapid_window_minutes)?;
        check_positive(
            "overtrading.rapid_saturation_count",
            o.rapid_saturation_count as f64,
        )?;
        check_positive("overtrading.max_day_multiple", o.max_day_multiple)?;

        let l = &self.loss_aversion;
        check_weights("loss_aversion", &[l.loss_cut_weight, l.size_ratio_weight])?;
        if !(l.loss_cut_threshold > 0.0 && l.loss_cut_threshold < 1.0) {
            return Err(AnalysisError::InvalidConfig(
                "loss_aversion.loss_cut_threshold must be in (0, 1)".to_string(),
            ));
        }
        check_positive("loss_aversion.size_ratio_threshold", l.size_ratio_threshold)?;

        let r = &self.revenge_trading;
        check_weights(
            "revenge_trading",
            &[r.post_loss_weight, r.size_increase_weight, r.loss_streak_weight],
        )?;
        check_window(
            "revenge_trading.post_loss_window_minutes",
            r.post_loss_window_minutes,
        )?;
        check_positive(
            "revenge_trading.post_loss_saturation_count",
            r.post_loss_saturation_count as f64,
        )?;
        check_positive(
            "revenge_trading.size_increase_threshold",
            r.size_increase_threshold,
        )?;
        check_positive(
            "revenge_trading.loss_streak_threshold",
            r.loss_streak_threshold as f64,
        )?;

        let s = &self.scoring;
        check_weights(
            "scoring.risk",
            &[
                s.overtrading_risk_weight,
                s.loss_aversion_risk_weight,
                s.revenge_trading_risk_weight,
            ],
        )?;
        let severity_ordered = 0.0 < s.medium_severity_from
            && s.medium_severity_from < s.high_severity_from
            && s.high_severity_from <= 1.0;
        if !severity_ordered {
            return Err(AnalysisError::InvalidConfig(
                "scoring severity bounds must satisfy 0 < medium < high <= 1".to_string(),
            ));
        }
        let profile_ordered =
            s.moderate_profile_from < s.aggressive_profile_from && s.aggressive_profile_from <= 100;
        if !profile_ordered {
            return Err(AnalysisError::InvalidConfig(
                "scoring profile bounds must satisfy moderate < aggressive <= 100".to_string(),
            ));
        }
        if s.max_recommendations == 0 {
            return Err(AnalysisError::InvalidConfig(
                "scoring.max_recommendations must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_weights(section: &str, weights: &[f64]) -> Result<(), AnalysisError> {
    if weights.iter().any(|w| *w < 0.0) {
        return Err(AnalysisError::InvalidConfig(format!(
            "{} weights must not be negative",
            section
        )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(AnalysisError::InvalidConfig(format!(
            "{} weights sum to {:.4}, expected 1.0",
            section, sum
        )));
    }
    Ok(())
}

fn check_window(name: &str, minutes: i64) -> Result<(), AnalysisError> {
    if minutes > MAX_WINDOW_MINUTES {
        return Err(AnalysisError::InvalidConfig(format!(
            "{} must be at most {} minutes",
            name, MAX_WINDOW_MINUTES
        )));
    }
    check_positive(name, minutes as f64)
}

fn check_positive(name: &str, value: f64) -> Result<(), AnalysisError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(AnalysisError::InvalidConfig(format!("{} must be positive", name)))
    }
}

/// Overtrading detector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OvertradingConfig {
    /// Mean trades per calendar day (UTC) above which the signal triggers
    pub trades_per_day_threshold: f64,
    /// Same-asset trades closer than this count as rapid succession
    pub rapid_window_minutes: i64,
    /// Rapid-succession count at which the signal reaches full intensity
    pub rapid_saturation_count: u32,
    /// Busiest day must exceed this multiple of the daily mean to trigger
    pub max_day_multiple: f64,
    pub trades_per_day_weight: f64,
    pub rapid_succession_weight: f64,
    pub max_single_day_weight: f64,
}

impl Default for OvertradingConfig {
    fn default() -> Self {
        Self {
            trades_per_day_threshold: 5.0,
            rapid_window_minutes: 5,
            rapid_saturation_count: 3,
            max_day_multiple: 2.0,
            trades_per_day_weight: 0.40,
            rapid_succession_weight: 0.35,
            max_single_day_weight: 0.25,
        }
    }
}

/// Loss aversion detector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossAversionConfig {
    /// Fraction of losers larger than the average win above which we trigger
    pub loss_cut_threshold: f64,
    /// avg win / avg loss below this triggers
    pub size_ratio_threshold: f64,
    pub loss_cut_weight: f64,
    pub size_ratio_weight: f64,
}

impl Default for LossAversionConfig {
    fn default() -> Self {
        Self {
            loss_cut_threshold: 0.4,
            size_ratio_threshold: 1.0,
            loss_cut_weight: 0.5,
            size_ratio_weight: 0.5,
        }
    }
}

/// Revenge trading detector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevengeTradingConfig {
    /// A related trade this soon after a loss counts as a post-loss trade
    pub post_loss_window_minutes: i64,
    /// Post-loss count at which the signal reaches full intensity
    pub post_loss_saturation_count: u32,
    /// Mean next-size / loss-size ratio above which we trigger
    pub size_increase_threshold: f64,
    /// Consecutive losses at or above this trigger
    pub loss_streak_threshold: u32,
    pub post_loss_weight: f64,
    pub size_increase_weight: f64,
    pub loss_streak_weight: f64,
}

impl Default for RevengeTradingConfig {
    fn default() -> Self {
        Self {
            post_loss_window_minutes: 15,
            post_loss_saturation_count: 3,
            size_increase_threshold: 1.2,
            loss_streak_threshold: 3,
            post_loss_weight: 0.35,
            size_increase_weight: 0.35,
            loss_streak_weight: 0.30,
        }
    }
}

/// Severity tiers and risk profile derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub medium_severity_from: f64,
    pub high_severity_from: f64,
    pub overtrading_risk_weight: f64,
    pub loss_aversion_risk_weight: f64,
    pub revenge_trading_risk_weight: f64,
    pub moderate_profile_from: u8,
    pub aggressive_profile_from: u8,
    /// Recommendations kept per bias
    pub max_recommendations: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            medium_severity_from: 0.34,
            high_severity_from: 0.67,
            overtrading_risk_weight: 0.30,
            loss_aversion_risk_weight: 0.35,
            revenge_trading_risk_weight: 0.35,
            moderate_profile_from: 34,
            aggressive_profile_from: 67,
            max_recommendations: 2,
        }
    }
}

impl ScoringConfig {
    pub fn severity(&self, score: f64) -> Severity {
        if score < self.medium_severity_from {
            Severity::Low
        } else if score < self.high_severity_from {
            Severity::Medium
        } else {
            Severity::High
        }
    }

    pub fn profile(&self, score: u8) -> RiskProfileKind {
        if score < self.moderate_profile_from {
            RiskProfileKind::Conservative
        } else if score < self.aggressive_profile_from {
            RiskProfileKind::Moderate
        } else {
            RiskProfileKind::Aggressive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = AnalysisConfig::default();
        config.overtrading.trades_per_day_weight = 0.9;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
        assert!(err.to_string().contains("overtrading"));
    }

    #[test]
    fn test_windows_are_bounded() {
        let mut config = AnalysisConfig::default();
        config.overtrading.rapid_window_minutes = i64::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("overtrading.rapid_window_minutes"));

        let mut config = AnalysisConfig::default();
        config.revenge_trading.post_loss_window_minutes = MAX_WINDOW_MINUTES + 1;
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidConfig(_))));

        config.revenge_trading.post_loss_window_minutes = MAX_WINDOW_MINUTES;
        assert!(config.validate().is_ok());

        config.revenge_trading.post_loss_window_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_recommendations_must_be_kept() {
        let mut config = AnalysisConfig::default();
        config.scoring.max_recommendations = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_recommendations"));
    }

    #[test]
    fn test_severity_tiers() {
        let scoring = ScoringConfig::default();
        assert_eq!(scoring.severity(0.0), Severity::Low);
        assert_eq!(scoring.severity(0.339), Severity::Low);
        assert_eq!(scoring.severity(0.34), Severity::Medium);
        assert_eq!(scoring.severity(0.669), Severity::Medium);
        assert_eq!(scoring.severity(0.67), Severity::High);
        assert_eq!(scoring.severity(1.0), Severity::High);
    }

    #[test]
    fn test_profile_tiers() {
        let scoring = ScoringConfig::default();
        assert_eq!(scoring.profile(0), RiskProfileKind::Conservative);
        assert_eq!(scoring.profile(33), RiskProfileKind::Conservative);
        assert_eq!(scoring.profile(34), RiskProfileKind::Moderate);
        assert_eq!(scoring.profile(66), RiskProfileKind::Moderate);
        assert_eq!(scoring.profile(67), RiskProfileKind::Aggressive);
        assert_eq!(scoring.profile(100), RiskProfileKind::Aggressive);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: AnalysisConfig = serde_json::from_value(serde_json::json!({
            "overtrading": { "trades_per_day_threshold": 8.0 }
        }))
        .unwrap();
        assert_eq!(config.overtrading.trades_per_day_threshold, 8.0);
        assert_eq!(config.overtrading.rapid_window_minutes, 5);
        assert_eq!(config.revenge_trading, RevengeTradingConfig::default());
    }
}
