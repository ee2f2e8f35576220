//! Bias scorer - turns detector signals into a scored, explained result

pub mod templates;

use crate::config::ScoringConfig;
use crate::detectors::{round_to, WeightedSignal};
use crate::types::{BiasKind, BiasResult, Signal};
use tracing::debug;

/// Score one bias from its weighted signals
pub fn score_bias(
    kind: BiasKind,
    weighted: Vec<WeightedSignal>,
    config: &ScoringConfig,
) -> BiasResult {
    let raw: f64 = weighted.iter().map(|w| w.contribution()).sum();
    let score = round_to(raw.clamp(0.0, 1.0), 3);
    let severity = config.severity(score);

    let signals: Vec<Signal> = weighted.iter().map(|w| w.signal.clone()).collect();
    let signal_refs: Vec<&Signal> = signals.iter().collect();

    let summary = match most_salient(&weighted) {
        Some(salient) => templates::summary(kind, severity, &salient.signal),
        None => format!("{}: no signals available.", kind.display_name()),
    };
    let recommendations =
        templates::recommendations(kind, &signal_refs, config.max_recommendations);

    debug!(
        bias = kind.as_str(),
        score,
        severity = severity.as_str(),
        triggered = signals.iter().filter(|s| s.triggered).count(),
        "bias scored"
    );

    BiasResult {
        bias: kind,
        score,
        severity,
        summary,
        signals,
        recommendations,
    }
}

/// Signal with the largest weighted contribution. When nothing contributes,
/// the first scored (non-informational) signal.
fn most_salient(weighted: &[WeightedSignal]) -> Option<&WeightedSignal> {
    let mut best: Option<&WeightedSignal> = None;
    for candidate in weighted.iter().filter(|w| w.contribution() > 0.0) {
        match best {
            Some(current) if candidate.contribution() <= current.contribution() => {}
            _ => best = Some(candidate),
        }
    }

    best.or_else(|| weighted.iter().find(|w| w.weight > 0.0))
        .or_else(|| weighted.first())
}
