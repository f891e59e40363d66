//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, the single seam between the
//! ingestion pipeline and a market data vendor. The pipeline only ever holds an
//! `Arc<dyn DataProvider>`; the concrete vendor (Alpaca today) and test doubles
//! plug in behind it.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use bar_ingestor::models::{BarSeries, BarsRequestParams};
//! use bar_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     fn name(&self) -> &str {
//!         "my_provider"
//!     }
//!
//!     async fn fetch_bars(
//!         &self,
//!         params: BarsRequestParams,
//!     ) -> Result<BarSeries, ProviderError> {
//!         Ok(BarSeries::empty(params.symbol, params.resolution))
//!     }
//! }
//! ```

pub mod alpaca_rest;

use async_trait::async_trait;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{BarSeries, BarsRequestParams};

/// Trait for fetching time-series bar data from a market data provider.
///
/// Implementations are shared read-only across concurrent chunk fetches, so
/// they must be `Send + Sync` and keep no per-request mutable state beyond
/// what they synchronise themselves (e.g. a rate limiter).
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider, used in log lines.
    fn name(&self) -> &str;

    /// Fetches bars for one symbol over `[params.start, params.end]`.
    ///
    /// An empty series is a valid answer (holidays, weekends, illiquid
    /// symbols). Errors are transient from the caller's point of view: the
    /// pipeline drops the affected chunk and carries on.
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },

    /// The configured base URL cannot be parsed.
    #[snafu(display("Invalid base URL '{url}': {message}"))]
    InvalidBaseUrl {
        url: String,
        message: String,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API answered with a non-success status (e.g. 429, 403).
    #[snafu(display("API error (HTTP {status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// An internal error occurred while processing data within the provider.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },
}
