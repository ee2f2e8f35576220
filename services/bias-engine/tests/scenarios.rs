//! End-to-end behavior of the engine on representative trade histories

use bias_engine::*;
use serde_json::json;

fn raw(timestamp: &str, asset: &str, quantity: f64, profit_loss: f64) -> RawTrade {
    serde_json::from_value(json!({
        "timestamp": timestamp,
        "asset": asset,
        "side": "buy",
        "quantity": quantity,
        "entry_price": 100.0,
        "exit_price": 101.0,
        "profit_loss": profit_loss,
        "balance": 10_000.0 + profit_loss,
    }))
    .expect("raw trade")
}

/// One trade per day, alternating wins of 100 and losses of 90
fn calm_history() -> Vec<RawTrade> {
    (1..=10)
        .map(|day| {
            let pnl = if day % 2 == 0 { -90.0 } else { 100.0 };
            raw(&format!("2024-03-{:02}T15:00:00Z", day), "SPY", 1.0, pnl)
        })
        .collect()
}

/// 20 trades three minutes apart; three same-asset pairs
fn frantic_session() -> Vec<RawTrade> {
    (0..20)
        .map(|i| {
            let asset = match i {
                0 | 1 => "AAPL".to_string(),
                2 | 3 => "TSLA".to_string(),
                4 | 5 => "NVDA".to_string(),
                n => format!("TICK{}", n),
            };
            raw(&format!("2024-03-04T10:{:02}:00Z", i * 3), &asset, 1.0, 10.0)
        })
        .collect()
}

/// 20 trades inside one hour; only the last three, on one asset, land under
/// five minutes apart
fn three_quick_reentries() -> Vec<RawTrade> {
    let mut trades: Vec<RawTrade> = (0..17)
        .map(|i| {
            let timestamp = format!("2024-03-04T10:{:02}:00Z", i * 3);
            raw(&timestamp, &format!("TICK{}", i), 1.0, 10.0)
        })
        .collect();
    for minute in [51, 53, 55] {
        trades.push(raw(&format!("2024-03-04T10:{}:00Z", minute), "AAPL", 1.0, 10.0));
    }
    trades
}

/// Five daily losses, then a trade ten times the usual size
fn revenge_sequence() -> Vec<RawTrade> {
    let mut trades: Vec<RawTrade> = (1..=5)
        .map(|day| raw(&format!("2024-03-{:02}T09:30:00Z", day), "ETH/USD", 1.0, -40.0))
        .collect();
    trades.push(raw("2024-03-06T09:30:00Z", "ETH/USD", 10.0, 25.0));
    trades
}

fn triggered(report: &Report, kind: BiasKind, key: &str) -> bool {
    report
        .bias(kind)
        .and_then(|b| b.signals.iter().find(|s| s.key == key))
        .map(|s| s.triggered)
        .unwrap_or(false)
}

#[test]
fn calm_history_is_conservative() -> anyhow::Result<()> {
    let report = analyze(&calm_history())?;

    for bias in &report.biases {
        assert_eq!(bias.severity, Severity::Low, "{:?}", bias.bias);
        assert_eq!(bias.score, 0.0);
        assert!(!bias.any_triggered());
    }
    assert_eq!(report.risk_profile.profile, RiskProfileKind::Conservative);
    assert_eq!(report.risk_profile.score, 0);
    assert_eq!(report.top_recommendation, None);
    assert_eq!(report.summary_stats.win_count, 5);
    assert_eq!(report.summary_stats.loss_count, 5);
    assert_eq!(report.summary_stats.win_rate, 0.5);
    Ok(())
}

#[test]
fn frantic_session_is_high_overtrading() -> anyhow::Result<()> {
    let report = analyze(&frantic_session())?;
    let overtrading = report.bias(BiasKind::Overtrading).expect("overtrading");

    assert!(overtrading.score >= 0.67, "score {}", overtrading.score);
    assert_eq!(overtrading.severity, Severity::High);
    assert!(triggered(&report, BiasKind::Overtrading, "trades_per_day"));
    assert!(triggered(&report, BiasKind::Overtrading, "rapid_succession_count"));
    assert!(!overtrading.recommendations.is_empty());
    assert_eq!(
        report.top_recommendation.as_deref(),
        Some(overtrading.recommendations[0].text.as_str())
    );
    Ok(())
}

#[test]
fn three_trades_under_five_minutes_is_high_overtrading() -> anyhow::Result<()> {
    let report = analyze(&three_quick_reentries())?;
    let overtrading = report.bias(BiasKind::Overtrading).expect("overtrading");
    let rapid = overtrading
        .signals
        .iter()
        .find(|s| s.key == "rapid_succession_count")
        .expect("rapid signal");

    assert_eq!(rapid.value, SignalValue::Count(2));
    assert!(rapid.triggered);
    assert!(overtrading.score >= 0.67, "score {}", overtrading.score);
    assert_eq!(overtrading.severity, Severity::High);
    Ok(())
}

#[test]
fn losses_slightly_bigger_than_wins_read_as_loss_aversion() -> anyhow::Result<()> {
    // Every loss (110) exceeds the average win (100), so the cut ratio saturates
    let trades: Vec<RawTrade> = (1..=10)
        .map(|day| {
            let pnl = if day % 2 == 0 { -110.0 } else { 100.0 };
            raw(&format!("2024-03-{:02}T15:00:00Z", day), "SPY", 1.0, pnl)
        })
        .collect();
    let report = analyze(&trades)?;
    let loss_aversion = report.bias(BiasKind::LossAversion).expect("loss aversion");

    assert!(triggered(&report, BiasKind::LossAversion, "loss_cut_ratio"));
    assert!(triggered(&report, BiasKind::LossAversion, "win_loss_size_ratio"));
    assert_eq!(loss_aversion.score, 0.773);
    assert_eq!(loss_aversion.severity, Severity::High);
    Ok(())
}

#[test]
fn losing_streak_then_oversized_trade_is_revenge() -> anyhow::Result<()> {
    let report = analyze(&revenge_sequence())?;

    assert!(triggered(&report, BiasKind::RevengeTrading, "loss_streak_continuation"));
    assert!(triggered(&report, BiasKind::RevengeTrading, "post_loss_size_increase"));
    let revenge = report.bias(BiasKind::RevengeTrading).expect("revenge");
    assert!(revenge.score > 0.0);
    assert_eq!(revenge.recommendations.len(), 2);
    Ok(())
}

#[test]
fn analysis_is_deterministic() -> anyhow::Result<()> {
    let trades = frantic_session();
    let first = analyze(&trades)?;
    let second = analyze(&trades)?;

    assert_eq!(first, second);
    assert_eq!(serde_json::to_string(&first)?, serde_json::to_string(&second)?);
    Ok(())
}

#[test]
fn input_order_does_not_matter() -> anyhow::Result<()> {
    let sorted = revenge_sequence();
    let mut shuffled = sorted.clone();
    shuffled.reverse();
    shuffled.swap(0, 3);

    assert_eq!(analyze(&sorted)?, analyze(&shuffled)?);
    Ok(())
}

#[test]
fn scores_stay_in_bounds() -> anyhow::Result<()> {
    for trades in [calm_history(), frantic_session(), revenge_sequence()] {
        let report = analyze(&trades)?;
        assert!(report.risk_profile.score <= 100);
        let stats = &report.summary_stats;
        assert!(stats.win_count + stats.loss_count <= report.trade_count);
        for bias in &report.biases {
            assert!((0.0..=1.0).contains(&bias.score));
            assert!(bias.recommendations.len() <= 2);
        }
    }
    Ok(())
}

#[test]
fn empty_input_is_an_analysis_error() {
    let err = analyze(&[]).unwrap_err();
    assert_eq!(err, EngineError::Analysis(AnalysisError::EmptyTradeSet));
}

#[test]
fn bad_quantity_names_the_field() {
    let mut trades = calm_history();
    trades[3].quantity = Some(json!("abc"));

    match analyze(&trades) {
        Err(EngineError::Validation(err)) => {
            assert_eq!(err.field, "quantity");
            assert_eq!(err.row, 3);
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
}

#[test]
fn custom_thresholds_change_the_outcome() -> anyhow::Result<()> {
    let mut config = AnalysisConfig::default();
    config.overtrading.trades_per_day_threshold = 50.0;
    let report = BiasEngine::new(config).analyze(&frantic_session())?;

    assert!(!triggered(&report, BiasKind::Overtrading, "trades_per_day"));
    assert!(triggered(&report, BiasKind::Overtrading, "rapid_succession_count"));
    Ok(())
}
