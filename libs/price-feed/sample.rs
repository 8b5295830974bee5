//! Normalized price observations

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// Number of fraction digits every published price carries
pub const PRICE_SCALE: u32 = 2;

/// One decoded price observation from the feed.
///
/// Immutable once created. `sequence` is 1-based and strictly increasing per
/// feed; the placeholder sample handed out before the first message has
/// sequence 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSample {
    /// Arrival counter (0 = placeholder)
    pub sequence: u64,

    /// Local wall-clock time the message was decoded
    pub received_at: DateTime<Utc>,

    /// Price with exactly [`PRICE_SCALE`] fraction digits
    pub value: Decimal,
}

impl PriceSample {
    /// Create a sample, normalizing `value` to two fraction digits
    pub fn new(sequence: u64, value: Decimal) -> Self {
        Self {
            sequence,
            received_at: Utc::now(),
            value: normalize_price(value),
        }
    }

    /// Sample reported by `latest()` before any message has arrived
    pub fn placeholder(value: Decimal) -> Self {
        Self::new(0, value)
    }

    pub fn is_placeholder(&self) -> bool {
        self.sequence == 0
    }
}

impl fmt::Display for PriceSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Round half away from zero to two digits and pad the scale to exactly two.
///
/// `64321.1` becomes `64321.10`, `87398.39000000` becomes `87398.39`,
/// `0.005` becomes `0.01`.
pub fn normalize_price(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(PRICE_SCALE);
    rounded
}
