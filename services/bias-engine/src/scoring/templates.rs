//! Fixed summary and recommendation templates
//!
//! Placeholders: `{label}`, `{value}`, `{threshold}` are filled from the
//! signal the template is keyed to.

use crate::detectors::{loss_aversion, overtrading, revenge_trading};
use crate::types::{BiasKind, Recommendation, Severity, Signal};

/// Catalogue entry, applicable when `signal` triggered
pub struct RecommendationTemplate {
    pub signal: &'static str,
    pub kind: &'static str,
    pub text: &'static str,
}

/// Ranked most-actionable first
const OVERTRADING_RECOMMENDATIONS: &[RecommendationTemplate] = &[
    RecommendationTemplate {
        signal: overtrading::RAPID_SUCCESSION_COUNT,
        kind: "cooldown",
        text: "Add a 10-minute cooldown before re-entering the same asset; {value} of your trades broke that rule.",
    },
    RecommendationTemplate {
        signal: overtrading::TRADES_PER_DAY,
        kind: "limit",
        text: "You averaged {value} trades per day. Cap yourself at {threshold} and write down the setup before each entry.",
    },
    RecommendationTemplate {
        signal: overtrading::MAX_TRADES_SINGLE_DAY,
        kind: "pause",
        text: "Your busiest day had {value} trades. Stop for the day once you pass {threshold} trades.",
    },
];

const LOSS_AVERSION_RECOMMENDATIONS: &[RecommendationTemplate] = &[
    RecommendationTemplate {
        signal: loss_aversion::WIN_LOSS_SIZE_RATIO,
        kind: "stop-loss",
        text: "Your average win is only {value}x your average loss. Set a hard stop-loss no wider than your average winning trade.",
    },
    RecommendationTemplate {
        signal: loss_aversion::LOSS_CUT_RATIO,
        kind: "exit-rule",
        text: "A {value} share of your losing trades grew larger than your average win. Decide the exit before entering and honor it.",
    },
    RecommendationTemplate {
        signal: loss_aversion::LOSS_CUT_RATIO,
        kind: "review",
        text: "Review every loss that outgrew your average win and note why you kept holding it.",
    },
];

const REVENGE_TRADING_RECOMMENDATIONS: &[RecommendationTemplate] = &[
    RecommendationTemplate {
        signal: revenge_trading::POST_LOSS_SIZE_INCREASE,
        kind: "size",
        text: "After a loss your next position averaged {value}x the losing one. Cut size by 25% after any losing trade instead of increasing it.",
    },
    RecommendationTemplate {
        signal: revenge_trading::LOSS_STREAK_CONTINUATION,
        kind: "streak",
        text: "You ran {value} losses in a row. After {threshold} consecutive losses, stop trading for at least an hour.",
    },
    RecommendationTemplate {
        signal: revenge_trading::POST_LOSS_TRADE_COUNT,
        kind: "cooldown",
        text: "{value} trades were opened right after a loss on the same asset. Step away for 15 minutes after every losing trade.",
    },
];

pub fn catalogue(kind: BiasKind) -> &'static [RecommendationTemplate] {
    match kind {
        BiasKind::Overtrading => OVERTRADING_RECOMMENDATIONS,
        BiasKind::LossAversion => LOSS_AVERSION_RECOMMENDATIONS,
        BiasKind::RevengeTrading => REVENGE_TRADING_RECOMMENDATIONS,
    }
}

/// Up to `limit` recommendations for the triggered signals, in catalogue order
pub fn recommendations(kind: BiasKind, signals: &[&Signal], limit: usize) -> Vec<Recommendation> {
    catalogue(kind)
        .iter()
        .filter_map(|template| {
            signals
                .iter()
                .find(|s| s.triggered && s.key == template.signal)
                .map(|signal| Recommendation {
                    kind: template.kind.to_string(),
                    text: render(template.text, signal),
                })
        })
        .take(limit)
        .collect()
}

pub fn summary(kind: BiasKind, severity: Severity, salient: &Signal) -> String {
    let template = match (kind, severity) {
        (BiasKind::Overtrading, Severity::Low) => {
            "Your trading pace looks measured. {label}: {value}."
        }
        (BiasKind::Overtrading, Severity::Medium) => {
            "Signs of overtrading: {label} reached {value}. Some sessions run hotter than your plan."
        }
        (BiasKind::Overtrading, Severity::High) => {
            "Strong overtrading pattern: {label} reached {value}. Trade count is likely eroding your edge."
        }
        (BiasKind::LossAversion, Severity::Low) => {
            "Wins and losses are sized in healthy proportion. {label}: {value}."
        }
        (BiasKind::LossAversion, Severity::Medium) => {
            "Moderate loss aversion: {label} is {value}. Some losing trades are held too long."
        }
        (BiasKind::LossAversion, Severity::High) => {
            "Pronounced loss aversion: {label} is {value}. Losers are running well past your winners."
        }
        (BiasKind::RevengeTrading, Severity::Low) => {
            "No clear revenge trading after losses. {label}: {value}."
        }
        (BiasKind::RevengeTrading, Severity::Medium) => {
            "Some revenge trading after losses: {label} is {value}."
        }
        (BiasKind::RevengeTrading, Severity::High) => {
            "Strong revenge trading pattern: {label} is {value}. Losses are driving your next trades."
        }
    };
    render(template, salient)
}

fn render(template: &str, signal: &Signal) -> String {
    let threshold = signal
        .threshold
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-".to_string());

    template
        .replace("{label}", &signal.label)
        .replace("{value}", &signal.value.to_string())
        .replace("{threshold}", &threshold)
}
