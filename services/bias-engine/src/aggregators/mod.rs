// Report aggregation: summary stats, risk profile, headline recommendation
use crate::config::ScoringConfig;
use crate::detectors::{ratio_or_zero, round_to};
use crate::types::*;

/// Win/loss counts, P&L totals and drawdown over the whole trade set
pub fn summary_stats(trades: &[Trade]) -> SummaryStats {
    let win_count = trades.iter().filter(|t| t.is_win()).count();
    let loss_count = trades.iter().filter(|t| t.is_loss()).count();
    let total_pnl: f64 = trades.iter().map(|t| t.profit_loss).sum();
    let count = trades.len() as f64;

    SummaryStats {
        win_rate: round_to(ratio_or_zero(win_count as f64, count), 3),
        total_pnl: round_to(total_pnl, 2),
        avg_pnl: round_to(ratio_or_zero(total_pnl, count), 2),
        win_count,
        loss_count,
        max_drawdown_pct: max_drawdown_pct(trades),
    }
}

/// Largest peak-to-trough balance decline, as a percentage of the peak.
/// The running peak starts at the first balance; a peak at or below zero
/// has no meaningful percentage and contributes nothing.
pub fn max_drawdown_pct(trades: &[Trade]) -> f64 {
    let mut balances = trades.iter().map(|t| t.balance);
    let Some(mut peak) = balances.next() else {
        return 0.0;
    };

    let mut worst = 0.0_f64;
    for balance in balances {
        if balance > peak {
            peak = balance;
            continue;
        }
        if peak > 0.0 {
            worst = worst.max((peak - balance) / peak * 100.0);
        }
    }

    round_to(worst, 2)
}

/// Weighted blend of the bias scores on a 0-100 scale
pub fn risk_profile(biases: &[BiasResult], config: &ScoringConfig) -> RiskProfile {
    let score_of = |kind: BiasKind| {
        biases
            .iter()
            .find(|b| b.bias == kind)
            .map(|b| b.score)
            .unwrap_or(0.0)
    };

    let overtrading = 100.0 * config.overtrading_risk_weight * score_of(BiasKind::Overtrading);
    let loss_aversion = 100.0 * config.loss_aversion_risk_weight * score_of(BiasKind::LossAversion);
    let revenge_trading =
        100.0 * config.revenge_trading_risk_weight * score_of(BiasKind::RevengeTrading);

    let score = (overtrading + loss_aversion + revenge_trading)
        .round()
        .clamp(0.0, 100.0) as u8;

    RiskProfile {
        profile: config.profile(score),
        score,
        components: RiskComponents {
            overtrading_contribution: round_to(overtrading, 1),
            loss_aversion_contribution: round_to(loss_aversion, 1),
            revenge_trading_contribution: round_to(revenge_trading, 1),
        },
    }
}

/// First recommendation of the highest-scoring bias that has any.
/// Ties go to the bias listed first.
pub fn top_recommendation(biases: &[BiasResult]) -> Option<String> {
    let mut best: Option<&BiasResult> = None;
    for bias in biases.iter().filter(|b| !b.recommendations.is_empty()) {
        match best {
            Some(current) if bias.score <= current.score => {}
            _ => best = Some(bias),
        }
    }

    best.and_then(|b| b.recommendations.first())
        .map(|r| r.text.clone())
}

/// First and last timestamps of a chronologically sorted, non-empty slice
pub fn date_range(trades: &[Trade]) -> Result<DateRange> {
    match (trades.first(), trades.last()) {
        (Some(first), Some(last)) => Ok(DateRange {
            from: first.timestamp,
            to: last.timestamp,
        }),
        _ => Err(AnalysisError::EmptyTradeSet.into()),
    }
}
