use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

/// One closed position, validated and normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: DateTime<Utc>,
    pub asset: String,
    pub side: Side,
    pub quantity: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub profit_loss: f64,
    pub balance: f64,     // Account equity after this trade, may be negative
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.profit_loss > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.profit_loss < 0.0
    }
}

/// Unvalidated trade record as it arrives from an upload or a form.
///
/// Fields stay loosely typed so the validator can report exactly which
/// field is missing or malformed instead of failing inside serde.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrade {
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
    #[serde(default)]
    pub asset: Option<serde_json::Value>,
    #[serde(default)]
    pub side: Option<serde_json::Value>,
    #[serde(default)]
    pub quantity: Option<serde_json::Value>,
    #[serde(default)]
    pub entry_price: Option<serde_json::Value>,
    #[serde(default)]
    pub exit_price: Option<serde_json::Value>,
    #[serde(default)]
    pub profit_loss: Option<serde_json::Value>,
    #[serde(default)]
    pub balance: Option<serde_json::Value>,
}

/// The fixed set of behavioral biases the engine scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasKind {
    Overtrading,
    LossAversion,
    RevengeTrading,
}

impl BiasKind {
    /// Report order
    pub const ALL: [BiasKind; 3] = [
        BiasKind::Overtrading,
        BiasKind::LossAversion,
        BiasKind::RevengeTrading,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BiasKind::Overtrading => "overtrading",
            BiasKind::LossAversion => "loss_aversion",
            BiasKind::RevengeTrading => "revenge_trading",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BiasKind::Overtrading => "Overtrading",
            BiasKind::LossAversion => "Loss Aversion",
            BiasKind::RevengeTrading => "Revenge Trading",
        }
    }
}

/// Severity band of a bias score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Numeric signal value. Counts stay integers on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Count(u64),
    Number(f64),
}

impl std::fmt::Display for SignalValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalValue::Count(c) => write!(f, "{}", c),
            SignalValue::Number(n) if n.fract() == 0.0 => write!(f, "{:.0}", n),
            SignalValue::Number(n) => write!(f, "{:.2}", n),
        }
    }
}

/// One measurable quantity feeding a bias score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub key: String,             // "trades_per_day"
    pub label: String,           // "Trades per day"
    pub value: SignalValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<SignalValue>,
    pub triggered: bool,
}

/// Ranked coaching recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: String,            // "cooldown", "stop-loss", ...
    pub text: String,
}

/// Scored result for a single bias
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasResult {
    pub bias: BiasKind,
    pub score: f64,              // 0.0 - 1.0
    pub severity: Severity,
    pub summary: String,
    pub signals: Vec<Signal>,
    pub recommendations: Vec<Recommendation>,
}

impl BiasResult {
    pub fn any_triggered(&self) -> bool {
        self.signals.iter().any(|s| s.triggered)
    }
}

/// Coarse overall classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskProfileKind {
    Conservative,
    Moderate,
    Aggressive,
}

/// Per-bias contribution to the risk score, in score points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskComponents {
    pub overtrading_contribution: f64,
    pub loss_aversion_contribution: f64,
    pub revenge_trading_contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub profile: RiskProfileKind,
    pub score: u8,               // 0 - 100, unlike bias scores
    pub components: RiskComponents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_pnl: f64,
    pub win_count: usize,
    pub loss_count: usize,
    pub max_drawdown_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Complete analysis output. Contains no wall-clock data so identical
/// input always serializes to identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub trade_count: usize,
    pub date_range: DateRange,
    pub trades: Vec<Trade>,
    pub biases: Vec<BiasResult>,
    pub risk_profile: RiskProfile,
    pub summary_stats: SummaryStats,
    pub top_recommendation: Option<String>,
}

impl Report {
    pub fn bias(&self, kind: BiasKind) -> Option<&BiasResult> {
        self.biases.iter().find(|b| b.bias == kind)
    }
}

/// A malformed trade record. `row` is the 0-based index in the input batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("trade {row}: invalid `{field}`: {reason}")]
pub struct ValidationError {
    pub row: usize,
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(row: usize, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            row,
            field,
            reason: reason.into(),
        }
    }
}

/// Structurally valid input that cannot be analyzed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis requires at least one trade")]
    EmptyTradeSet,

    #[error("internal invariant violated: {0}")]
    Invariant(String),

    #[error("invalid analysis configuration: {0}")]
    InvalidConfig(String),
}

/// Error types for the engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
