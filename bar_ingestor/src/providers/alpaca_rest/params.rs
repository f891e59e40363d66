use serde::{Deserialize, Serialize};

use crate::{
    models::{BarsRequestParams, ProviderParams},
    providers::{ProviderError, ValidationSnafu},
};

/// Largest page the bars endpoint will return in one response.
pub const MAX_PAGE_SIZE: u32 = 10_000;

/// Specifies the source feed for stock data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    #[default]
    Sip,
    Iex,
    Otc,
}

impl Feed {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Feed::Sip => "sip",
            Feed::Iex => "iex",
            Feed::Otc => "otc",
        }
    }
}

/// Alpaca-specific parameters for a bars request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct AlpacaBarsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<Feed>,
}

/// Rejects requests the endpoint would refuse anyway.
pub fn validate_params(params: &BarsRequestParams) -> Result<(), ProviderError> {
    if params.symbol.trim().is_empty() {
        return ValidationSnafu {
            message: "symbol must not be empty",
        }
        .fail();
    }
    if params.start > params.end {
        return ValidationSnafu {
            message: format!("start {} is after end {}", params.start, params.end),
        }
        .fail();
    }
    if params.limit == Some(0) {
        return ValidationSnafu {
            message: "limit must be at least 1",
        }
        .fail();
    }
    Ok(())
}

/// Builds the query string for one page of a bars request.
///
/// `page_size` is the number of rows still wanted; it is clamped to the
/// endpoint's page maximum.
pub fn construct_params(
    params: &BarsRequestParams,
    page_size: u32,
    page_token: Option<&str>,
) -> Vec<(String, String)> {
    let mut query = vec![
        ("symbols".to_string(), params.symbol.clone()),
        (
            "timeframe".to_string(),
            params.resolution.alpaca_timeframe().to_string(),
        ),
        ("start".to_string(), params.start.to_rfc3339()),
        ("end".to_string(), params.end.to_rfc3339()),
        (
            "adjustment".to_string(),
            params.adjustment.as_str().to_string(),
        ),
        (
            "limit".to_string(),
            page_size.clamp(1, MAX_PAGE_SIZE).to_string(),
        ),
    ];

    if let ProviderParams::Alpaca(AlpacaBarsParams { feed: Some(feed) }) =
        &params.provider_specific
    {
        query.push(("feed".to_string(), feed.as_str().to_string()));
    }
    // Pagination and the row cap both assume oldest-first pages.
    query.push(("sort".to_string(), "asc".to_string()));

    if let Some(token) = page_token {
        query.push(("page_token".to_string(), token.to_string()));
    }
    query
}
