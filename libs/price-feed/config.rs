//! Feed configuration

use crate::transport::{ExponentialBackoff, NeverReconnect, ReconnectionStrategy};
use crate::{FeedError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Base URL for Binance combined streams
pub const DEFAULT_ENDPOINT: &str = "wss://stream.binance.com:9443";

/// Trade stream the chart follows
pub const DEFAULT_STREAM: &str = "btcusdt@trade";

/// Value reported by `latest()` before the first message
pub const DEFAULT_PLACEHOLDER_PRICE: &str = "120000";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    pub endpoint: String,
    pub stream: String,
    /// Decimal string, e.g. "120000"
    pub placeholder_price: String,
    pub reconnect: ReconnectConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            stream: DEFAULT_STREAM.to_string(),
            placeholder_price: DEFAULT_PLACEHOLDER_PRICE.to_string(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl FeedConfig {
    /// Full combined-stream URL
    pub fn url(&self) -> String {
        crate::binance::stream_url(&self.endpoint, &self.stream)
    }

    pub fn placeholder(&self) -> Result<Decimal> {
        Decimal::from_str(self.placeholder_price.trim()).map_err(|e| {
            FeedError::Configuration(format!(
                "placeholder_price {:?} is not a decimal: {}",
                self.placeholder_price, e
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("ws://") || self.endpoint.starts_with("wss://")) {
            return Err(FeedError::Configuration(format!(
                "endpoint must be ws:// or wss://, got {}",
                self.endpoint
            )));
        }
        if self.stream.trim().is_empty() {
            return Err(FeedError::Configuration("stream must not be empty".into()));
        }
        self.placeholder()?;
        self.reconnect.validate()
    }
}

/// Reconnect policy. `enabled: false` keeps a single connection for the
/// whole run: after a drop the feed serves its last value indefinitely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReconnectConfig {
    pub enabled: bool,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_attempts: Option<usize>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            max_attempts: None,
        }
    }
}

impl ReconnectConfig {
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.initial_delay_ms == 0 {
            return Err(FeedError::Configuration(
                "reconnect.initial_delay_ms must be greater than 0".into(),
            ));
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return Err(FeedError::Configuration(
                "reconnect.max_delay_ms must be >= initial_delay_ms".into(),
            ));
        }
        Ok(())
    }

    pub fn strategy(&self) -> Box<dyn ReconnectionStrategy> {
        if self.enabled {
            Box::new(ExponentialBackoff::new(
                Duration::from_millis(self.initial_delay_ms),
                Duration::from_millis(self.max_delay_ms),
                self.max_attempts,
            ))
        } else {
            Box::new(NeverReconnect)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url() {
        let config = FeedConfig::default();
        assert_eq!(
            config.url(),
            "wss://stream.binance.com:9443/stream?streams=btcusdt@trade"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_placeholder_must_be_decimal() {
        let config = FeedConfig {
            placeholder_price: "lots".into(),
            ..FeedConfig::default()
        };
        assert!(matches!(config.validate(), Err(FeedError::Configuration(_))));
    }

    #[test]
    fn test_rejects_http_endpoint() {
        let config = FeedConfig {
            endpoint: "https://stream.binance.com".into(),
            ..FeedConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disabled_reconnect_never_retries() {
        let reconnect = ReconnectConfig {
            enabled: false,
            ..ReconnectConfig::default()
        };
        assert!(reconnect.strategy().next_delay(0).is_none());
    }

    #[test]
    fn test_enabled_reconnect_backs_off_with_cap() {
        let strategy = ReconnectConfig::default().strategy();
        assert_eq!(strategy.next_delay(0), Some(Duration::from_millis(500)));
        assert_eq!(strategy.next_delay(1), Some(Duration::from_millis(1000)));
        assert_eq!(strategy.next_delay(20), Some(Duration::from_secs(30)));
    }
}
