//! Upload parsing: CSV and JSON trade exports into raw trade records
//!
//! Parsing only checks structure (columns present, well-formed CSV/JSON).
//! Field-level validation is left to the engine so both paths report the
//! same errors.

use bias_engine::RawTrade;
use serde_json::Value;

/// Columns every upload must carry
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "timestamp",
    "asset",
    "side",
    "quantity",
    "entry_price",
    "exit_price",
    "profit_loss",
    "balance",
];

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Only CSV or JSON files are accepted, got {0:?}")]
    UnsupportedFormat(String),

    #[error("Missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Upload contains no trades")]
    NoTrades,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Json,
}

impl UploadFormat {
    /// Explicit `format` wins; otherwise infer from the file extension
    pub fn detect(format: Option<&str>, filename: Option<&str>) -> Result<Self, IngestError> {
        let hint = match (format, filename) {
            (Some(f), _) => f.trim().to_lowercase(),
            (None, Some(name)) => name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_lowercase())
                .unwrap_or_default(),
            (None, None) => String::new(),
        };

        match hint.as_str() {
            "csv" => Ok(UploadFormat::Csv),
            "json" => Ok(UploadFormat::Json),
            _ => Err(IngestError::UnsupportedFormat(hint)),
        }
    }
}

/// Parse an upload body in the given format
pub fn parse_upload(format: UploadFormat, body: &[u8]) -> Result<Vec<RawTrade>, IngestError> {
    let trades = match format {
        UploadFormat::Csv => parse_csv(body)?,
        UploadFormat::Json => parse_json(body)?,
    };

    if trades.is_empty() {
        return Err(IngestError::NoTrades);
    }
    Ok(trades)
}

/// CSV with a header row. Extra columns are ignored; header names are
/// matched case-insensitively. Empty cells become missing fields.
pub fn parse_csv(body: &[u8]) -> Result<Vec<RawTrade>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(body);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_lowercase())
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns(missing));
    }

    let mut trades = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut raw = RawTrade::default();

        for (header, cell) in headers.iter().zip(record.iter()) {
            let value = if cell.is_empty() {
                None
            } else {
                Some(Value::String(cell.to_string()))
            };
            match header.as_str() {
                "timestamp" => raw.timestamp = value,
                "asset" => raw.asset = value,
                "side" => raw.side = value,
                "quantity" => raw.quantity = value,
                "entry_price" => raw.entry_price = value,
                "exit_price" => raw.exit_price = value,
                "profit_loss" => raw.profit_loss = value,
                "balance" => raw.balance = value,
                _ => {}
            }
        }
        trades.push(raw);
    }

    Ok(trades)
}

/// JSON array of trade objects, or `{"trades": [...]}`
pub fn parse_json(body: &[u8]) -> Result<Vec<RawTrade>, IngestError> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Payload {
        List(Vec<RawTrade>),
        Wrapped { trades: Vec<RawTrade> },
    }

    match serde_json::from_slice::<Payload>(body)? {
        Payload::List(trades) | Payload::Wrapped { trades } => Ok(trades),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HEADER: &str = "timestamp,asset,side,quantity,entry_price,exit_price,profit_loss,balance";

    #[test]
    fn test_detect_format() {
        assert_eq!(UploadFormat::detect(Some("CSV"), None).unwrap(), UploadFormat::Csv);
        assert_eq!(
            UploadFormat::detect(None, Some("trades.export.json")).unwrap(),
            UploadFormat::Json
        );
        assert_eq!(
            UploadFormat::detect(Some("json"), Some("trades.csv")).unwrap(),
            UploadFormat::Json
        );
        assert!(matches!(
            UploadFormat::detect(None, Some("trades.xlsx")),
            Err(IngestError::UnsupportedFormat(_))
        ));
        assert!(UploadFormat::detect(None, None).is_err());
    }

    #[test]
    fn test_parse_csv() {
        let body = format!(
            "{}\n2024-03-01 09:30:00, AAPL ,BUY,10,180.5,182,15,10015\n2024-03-01 10:00:00,TSLA,sell,5,200,198,,9990\n",
            HEADER
        );
        let trades = parse_csv(body.as_bytes()).unwrap();

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].asset, Some(json!("AAPL")));
        assert_eq!(trades[0].quantity, Some(json!("10")));
        assert_eq!(trades[1].profit_loss, None);
    }

    #[test]
    fn test_csv_header_order_and_case_do_not_matter() {
        let body = "Balance,Asset,Side,Quantity,Entry_Price,Exit_Price,Profit_Loss,Timestamp,Notes\n\
                    1000,BTC,buy,1,100,110,10,2024-03-01T00:00:00Z,fomo\n";
        let trades = parse_csv(body.as_bytes()).unwrap();

        assert_eq!(trades[0].balance, Some(json!("1000")));
        assert_eq!(trades[0].timestamp, Some(json!("2024-03-01T00:00:00Z")));
    }

    #[test]
    fn test_csv_missing_columns() {
        let body = "timestamp,asset,side,quantity\n2024-03-01,BTC,buy,1\n";
        match parse_csv(body.as_bytes()) {
            Err(IngestError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["entry_price", "exit_price", "profit_loss", "balance"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_json_shapes() {
        let list = br#"[{"timestamp": "2024-03-01", "asset": "BTC", "quantity": 1}]"#;
        assert_eq!(parse_json(list).unwrap().len(), 1);

        let wrapped = br#"{"trades": [{"asset": "BTC"}, {"asset": "ETH"}]}"#;
        assert_eq!(parse_json(wrapped).unwrap().len(), 2);

        assert!(matches!(parse_json(b"not json"), Err(IngestError::Json(_))));
    }

    #[test]
    fn test_empty_upload_is_rejected() {
        assert!(matches!(
            parse_upload(UploadFormat::Csv, HEADER.as_bytes()),
            Err(IngestError::NoTrades)
        ));
        assert!(matches!(parse_upload(UploadFormat::Json, b"[]"), Err(IngestError::NoTrades)));
    }
}
