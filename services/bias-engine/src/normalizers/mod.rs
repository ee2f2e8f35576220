// Validation and normalization of raw trade records into canonical trades
use crate::types::*;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Naive timestamp layouts accepted in addition to RFC 3339 (read as UTC)
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Validate a batch of raw records and return them sorted by timestamp.
///
/// The batch fails on the first bad record; nothing is silently dropped.
/// Ties keep their input order.
pub fn validate_trades(raw: &[RawTrade]) -> std::result::Result<Vec<Trade>, ValidationError> {
    let mut trades = raw
        .iter()
        .enumerate()
        .map(|(row, record)| validate_trade(row, record))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    sort_chronologically(&mut trades);
    Ok(trades)
}

/// Stable sort by timestamp. Idempotent.
pub fn sort_chronologically(trades: &mut [Trade]) {
    trades.sort_by_key(|t| t.timestamp);
}

/// Validate a single record
pub fn validate_trade(row: usize, raw: &RawTrade) -> std::result::Result<Trade, ValidationError> {
    let timestamp = parse_timestamp(row, raw.timestamp.as_ref())?;
    let asset = parse_asset(row, raw.asset.as_ref())?;
    let side = parse_side(row, raw.side.as_ref())?;

    let quantity = parse_positive(row, "quantity", raw.quantity.as_ref())?;
    let entry_price = parse_positive(row, "entry_price", raw.entry_price.as_ref())?;
    let exit_price = parse_positive(row, "exit_price", raw.exit_price.as_ref())?;
    let profit_loss = parse_number(row, "profit_loss", raw.profit_loss.as_ref())?;
    let balance = parse_number(row, "balance", raw.balance.as_ref())?;

    Ok(Trade {
        timestamp,
        asset,
        side,
        quantity,
        entry_price,
        exit_price,
        profit_loss,
        balance,
    })
}

fn parse_number(
    row: usize,
    field: &'static str,
    value: Option<&Value>,
) -> std::result::Result<f64, ValidationError> {
    let number = match value {
        None | Some(Value::Null) => {
            return Err(ValidationError::new(row, field, "missing"));
        }
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(other) => {
            return Err(ValidationError::new(
                row,
                field,
                format!("expected a number, got {}", other),
            ));
        }
    };

    match number {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(ValidationError::new(
            row,
            field,
            format!("not a finite number: {}", display_value(value)),
        )),
    }
}

fn parse_positive(
    row: usize,
    field: &'static str,
    value: Option<&Value>,
) -> std::result::Result<f64, ValidationError> {
    let number = parse_number(row, field, value)?;
    if number <= 0.0 {
        return Err(ValidationError::new(
            row,
            field,
            format!("must be positive, got {}", number),
        ));
    }
    Ok(number)
}

fn parse_timestamp(
    row: usize,
    value: Option<&Value>,
) -> std::result::Result<DateTime<Utc>, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::new(row, "timestamp", "missing")),
        Some(Value::String(s)) => parse_timestamp_str(s.trim()).ok_or_else(|| {
            ValidationError::new(row, "timestamp", format!("unrecognized date/time {:?}", s))
        }),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .ok_or_else(|| {
                ValidationError::new(row, "timestamp", format!("invalid unix seconds {}", n))
            }),
        Some(other) => Err(ValidationError::new(
            row,
            "timestamp",
            format!("expected a date/time string, got {}", other),
        )),
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_asset(row: usize, value: Option<&Value>) -> std::result::Result<String, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::new(row, "asset", "missing")),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(ValidationError::new(row, "asset", "must not be empty"))
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(other) => Err(ValidationError::new(
            row,
            "asset",
            format!("expected a string, got {}", other),
        )),
    }
}

fn parse_side(row: usize, value: Option<&Value>) -> std::result::Result<Side, ValidationError> {
    let side = match value {
        None | Some(Value::Null) => return Err(ValidationError::new(row, "side", "missing")),
        Some(Value::String(s)) => s.trim().to_lowercase(),
        Some(other) => {
            return Err(ValidationError::new(
                row,
                "side",
                format!("expected \"buy\" or \"sell\", got {}", other),
            ));
        }
    };

    match side.as_str() {
        "buy" => Ok(Side::Buy),
        "sell" => Ok(Side::Sell),
        _ => Err(ValidationError::new(
            row,
            "side",
            format!("expected \"buy\" or \"sell\", got {:?}", side),
        )),
    }
}

fn display_value(value: Option<&Value>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
