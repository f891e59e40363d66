use std::path::PathBuf;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::NormalizedSeries;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// Records could not be encoded into the destination format.
    #[snafu(display("Failed to encode records: {source}"))]
    Encode {
        source: csv::Error,
        backtrace: Backtrace,
    },

    /// A file-system operation on `path` failed.
    #[snafu(display("I/O error on {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

#[async_trait]
pub trait DataSink {
    /// The type of output returned after a successful write operation.
    ///
    /// A file sink reports where it wrote and how many rows; a sink that
    /// declines empty input can say so instead of failing.
    type Output;

    /// Writes one normalized series to the destination.
    async fn write(&self, data: &NormalizedSeries) -> Result<Self::Output, SinkError>;
}
