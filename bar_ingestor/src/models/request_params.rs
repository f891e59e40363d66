use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{models::resolution::Resolution, providers::alpaca_rest::AlpacaBarsParams};

/// Corporate-action adjustment applied by the provider to historical prices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    Raw,
    Split,
    Dividend,
    #[default]
    All,
}

impl Adjustment {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Adjustment::Raw => "raw",
            Adjustment::Split => "split",
            Adjustment::Dividend => "dividend",
            Adjustment::All => "all",
        }
    }
}

/// Universal parameters for requesting bar data for one symbol.
///
/// This is the standard input for all
/// [`DataProvider`](crate::providers::DataProvider) implementations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// The symbol to request (e.g., `"SPY"`).
    pub symbol: String,

    /// The sampling granularity of the requested bars.
    pub resolution: Resolution,

    /// Start of the requested time range (inclusive, UTC).
    pub start: DateTime<Utc>,

    /// End of the requested time range (inclusive, UTC).
    pub end: DateTime<Utc>,

    /// Corporate-action adjustment policy.
    #[serde(default)]
    pub adjustment: Adjustment,

    /// Maximum number of rows the provider may return for this request.
    pub limit: Option<u32>,

    /// Optional, provider-specific parameters.
    #[serde(default)]
    pub provider_specific: ProviderParams,
}

/// An enum to hold provider-specific request parameters.
///
/// This allows callers to specify detailed, per-request options for a
/// particular provider without cluttering the universal `BarsRequestParams`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ProviderParams {
    #[default]
    None,
    Alpaca(AlpacaBarsParams),
}
