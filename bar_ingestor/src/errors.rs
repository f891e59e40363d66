use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::{io::sink::SinkError, providers::ProviderInitError};

/// The unified error type for the `bar_ingestor` crate.
///
/// Per-chunk provider failures never show up here: the pipeline records them
/// in its fetch report and keeps going.
#[derive(Debug, Error)]
pub enum Error {
    /// An error related to configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// The data provider could not be constructed.
    #[error("Provider initialisation failed: {0}")]
    ProviderInit(#[from] ProviderInitError),

    /// An error originating from a data sink (e.g. file I/O).
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// An existing cache artifact could not be parsed.
    #[error("Failed to read cached series at {}: {source}", path.display())]
    CacheRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
