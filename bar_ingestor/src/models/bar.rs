//! Canonical in-memory representation of a time-series bar (OHLCV).
//!
//! [`Bar`] is what every [`DataProvider`](crate::providers::DataProvider)
//! returns, at full provider precision. [`BarRecord`] is the normalized row the
//! aggregator produces and the CSV artifact stores: 32-bit prices and volume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::resolution::Resolution;

/// A single time-series bar (OHLCV) for a given timestamp.
///
/// OHLC relations (`high >= max(open, close)` and so on) are carried through
/// untouched; nothing in the pipeline asserts them.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// The timestamp for this bar (UTC).
    pub timestamp: DateTime<Utc>,

    /// Opening price.
    pub open: f64,

    /// Highest price during the bar interval.
    pub high: f64,

    /// Lowest price during the bar interval.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the bar interval.
    pub volume: u64,

    /// Trade count for the bar. Not all providers supply this.
    pub trade_count: Option<u64>,

    /// Volume-weighted average price. Not all providers supply this.
    pub vwap: Option<f64>,
}

/// The bars one provider request returned for a single symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "SPY").
    pub symbol: String,
    /// The sampling granularity of every bar in the series.
    pub resolution: Resolution,
    /// The collection of OHLCV bars, in provider order.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn empty(symbol: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            symbol: symbol.into(),
            resolution,
            bars: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// One normalized row of the persisted artifact.
///
/// Field order is the CSV column order: `timestamp,open,high,low,close,volume`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarRecord {
    pub timestamp: DateTime<Utc>,
    pub open: f32,
    pub high: f32,
    pub low: f32,
    pub close: f32,
    pub volume: i32,
}

impl From<&Bar> for BarRecord {
    fn from(bar: &Bar) -> Self {
        Self {
            timestamp: bar.timestamp,
            open: bar.open as f32,
            high: bar.high as f32,
            low: bar.low as f32,
            close: bar.close as f32,
            // Saturates instead of wrapping on the (rare) 2^31+ share bar.
            volume: i32::try_from(bar.volume).unwrap_or(i32::MAX),
        }
    }
}

/// Aggregated, normalized bars for one symbol: ascending, unique timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    pub symbol: String,
    pub resolution: Resolution,
    pub records: Vec<BarRecord>,
}

impl NormalizedSeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.records.first().map(|r| r.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.records.last().map(|r| r.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(volume: u64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap(),
            open: 472.16,
            high: 473.67,
            low: 470.49,
            close: 472.65,
            volume,
            trade_count: Some(812),
            vwap: Some(472.1),
        }
    }

    #[test]
    fn record_narrows_prices_to_f32() {
        let record = BarRecord::from(&bar(1_000));
        assert_eq!(record.open, 472.16_f32);
        assert_eq!(record.close, 472.65_f32);
        assert_eq!(record.volume, 1_000);
        assert!((record.high as f64 - 473.67).abs() < 1e-4);
    }

    #[test]
    fn record_volume_saturates() {
        let record = BarRecord::from(&bar(u64::from(u32::MAX)));
        assert_eq!(record.volume, i32::MAX);
    }
}
