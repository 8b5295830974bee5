//! Binance combined-stream messages
//!
//! The feed subscribes through the URL (`/stream?streams=btcusdt@trade`), so
//! no subscription frame is sent. Every inbound frame is a combined-stream
//! envelope:
//!
//! ```json
//! {
//!     "stream": "btcusdt@trade",
//!     "data": {
//!         "e": "trade",
//!         "E": 1766482935996,
//!         "s": "BTCUSDT",
//!         "p": "87398.39000000",
//!         "q": "0.00103000"
//!     }
//! }
//! ```
//!
//! Only `data.p` is required. Any other shape is unparsable.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

/// Why an inbound frame did not produce a price
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("binary frame ({0} bytes)")]
    NotText(usize),

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("non-numeric price: {0}")]
    InvalidPrice(String),
}

/// Combined stream wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct TradeEnvelope {
    /// Stream name (e.g., "btcusdt@trade")
    #[serde(default)]
    pub stream: Option<String>,

    /// Trade payload
    #[serde(default)]
    pub data: Option<TradeData>,
}

/// Trade payload. Everything except the price is informational.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeData {
    #[serde(rename = "e", default)]
    pub event_type: Option<String>,

    #[serde(rename = "E", default)]
    pub event_time: Option<u64>,

    #[serde(rename = "s", default)]
    pub symbol: Option<String>,

    /// Price, normally a numeric string; plain JSON numbers are accepted too
    #[serde(rename = "p", default)]
    pub price: Option<Value>,
}

/// Build the combined stream URL for one topic
pub fn stream_url(endpoint: &str, stream: &str) -> String {
    format!("{}/stream?streams={}", endpoint.trim_end_matches('/'), stream)
}

/// Extract the raw (not yet normalized) price from one text frame
pub fn decode_price(text: &str) -> Result<Decimal, DecodeError> {
    let envelope: TradeEnvelope =
        serde_json::from_str(text).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    let data = envelope.data.ok_or(DecodeError::MissingField("data"))?;
    let raw = data.price.ok_or(DecodeError::MissingField("p"))?;
    parse_price(&raw)
}

fn parse_price(raw: &Value) -> Result<Decimal, DecodeError> {
    let text = match raw {
        Value::String(s) => s.trim().to_string(),
        // arbitrary_precision keeps the literal digits
        Value::Number(n) => n.to_string(),
        other => return Err(DecodeError::InvalidPrice(other.to_string())),
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| DecodeError::InvalidPrice(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_url() {
        let url = stream_url("wss://stream.binance.com:9443", "btcusdt@trade");
        assert_eq!(url, "wss://stream.binance.com:9443/stream?streams=btcusdt@trade");

        let trailing = stream_url("ws://127.0.0.1:9000/", "ethusdt@trade");
        assert_eq!(trailing, "ws://127.0.0.1:9000/stream?streams=ethusdt@trade");
    }

    #[test]
    fn test_decode_full_trade_envelope() {
        let json = r#"{
            "stream": "btcusdt@trade",
            "data": {
                "e": "trade",
                "E": 1766482935996,
                "s": "BTCUSDT",
                "t": 5697810014,
                "p": "87398.39000000",
                "q": "0.00103000",
                "T": 1766482935995,
                "m": false,
                "M": true
            }
        }"#;

        let price = decode_price(json).unwrap();
        assert_eq!(price, Decimal::from_str("87398.39").unwrap());

        let envelope: TradeEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.stream.as_deref(), Some("btcusdt@trade"));
        let data = envelope.data.unwrap();
        assert_eq!(data.symbol.as_deref(), Some("BTCUSDT"));
        assert_eq!(data.event_time, Some(1766482935996));
    }

    #[test]
    fn test_decode_minimal_envelope() {
        let price = decode_price(r#"{"data":{"p":"64321.10"}}"#).unwrap();
        assert_eq!(price, Decimal::from_str("64321.10").unwrap());
    }

    #[test]
    fn test_decode_numeric_price() {
        let price = decode_price(r#"{"data":{"p":3456.789}}"#).unwrap();
        assert_eq!(price, Decimal::from_str("3456.789").unwrap());
    }

    #[test]
    fn test_decode_missing_price() {
        assert_eq!(
            decode_price(r#"{"data":{"q":"1.0"}}"#),
            Err(DecodeError::MissingField("p"))
        );
        assert_eq!(
            decode_price(r#"{"stream":"btcusdt@trade"}"#),
            Err(DecodeError::MissingField("data"))
        );
    }

    #[test]
    fn test_decode_non_numeric_price() {
        assert!(matches!(
            decode_price(r#"{"data":{"p":"abc"}}"#),
            Err(DecodeError::InvalidPrice(_))
        ));
        assert!(matches!(
            decode_price(r#"{"data":{"p":""}}"#),
            Err(DecodeError::InvalidPrice(_))
        ));
        assert!(matches!(
            decode_price(r#"{"data":{"p":true}}"#),
            Err(DecodeError::InvalidPrice(_))
        ));
        // null reads as absent
        assert_eq!(
            decode_price(r#"{"data":{"p":null}}"#),
            Err(DecodeError::MissingField("p"))
        );
    }

    #[test]
    fn test_decode_invalid_json() {
        assert!(matches!(decode_price("not json"), Err(DecodeError::InvalidJson(_))));
        assert!(matches!(decode_price("[1,2,3]"), Err(DecodeError::InvalidJson(_))));
        assert!(matches!(
            decode_price(r#"{"data":"p"}"#),
            Err(DecodeError::InvalidJson(_))
        ));
    }
}
