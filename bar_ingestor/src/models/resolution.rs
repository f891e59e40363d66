//! Sampling granularity of a bar series.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Invalid resolution: {input} (expected minute or day)")]
    InvalidInput { input: String },
}

/// Bar resolution supported by the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Minute,
    Day,
}

impl Resolution {
    /// Timeframe string understood by the Alpaca bars endpoint.
    pub const fn alpaca_timeframe(&self) -> &'static str {
        match self {
            Resolution::Minute => "1Min",
            Resolution::Day => "1Day",
        }
    }

    /// Short tag used in artifact file names.
    pub const fn tag(&self) -> &'static str {
        match self {
            Resolution::Minute => "minute",
            Resolution::Day => "day",
        }
    }

    /// Whether bars of this resolution fall inside a trading day and can be
    /// filtered by a session window.
    pub const fn is_intraday(&self) -> bool {
        matches!(self, Resolution::Minute)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Resolution {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "min" | "minute" | "1min" => Ok(Resolution::Minute),
            "d" | "day" | "daily" | "1day" => Ok(Resolution::Day),
            _ => Err(ResolutionError::InvalidInput {
                input: s.to_string(),
            }),
        }
    }
}
