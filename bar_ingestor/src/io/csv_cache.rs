//! On-disk CSV artifacts, one per `(symbol, range, resolution)`.
//!
//! An artifact that exists is authoritative: the pipeline returns it as-is and
//! never contacts the provider. Writes go to a sibling `*.csv.tmp` file that is
//! renamed into place, so a crashed run leaves no partial artifact behind.

use std::{
    io::{self, Read},
    path::PathBuf,
};

use async_trait::async_trait;
use snafu::ResultExt;
use tracing::{debug, info};

use crate::{
    errors::{Error, Result},
    io::sink::{DataSink, EncodeSnafu, IoSnafu, SinkError},
    models::{BarRecord, DateRange, NormalizedSeries, Resolution},
};

/// Identity of one cached artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub range: DateRange,
    pub resolution: Resolution,
}

impl CacheKey {
    /// `{SYMBOL}_{resolution}_{start}_to_{end}.csv`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}_to_{}.csv",
            self.symbol,
            self.resolution.tag(),
            self.range.start(),
            self.range.end()
        )
    }
}

/// Result of handing a series to a [`CsvSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Written { path: PathBuf, records: usize },
    /// The series was empty; nothing was written.
    NoData,
}

#[derive(Debug, Clone)]
pub struct CsvCache {
    dir: PathBuf,
}

impl CsvCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Loads the artifact for `key`, or `None` if it was never written.
    pub async fn load(&self, key: &CacheKey) -> Result<Option<NormalizedSeries>> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };

        let records = read_records(bytes.as_slice())
            .map_err(|source| Error::CacheRead { path: path.clone(), source })?;
        debug!(path = %path.display(), records = records.len(), "loaded cached series");

        Ok(Some(NormalizedSeries {
            symbol: key.symbol.clone(),
            resolution: key.resolution,
            records,
        }))
    }

    pub fn sink(&self, key: &CacheKey) -> CsvSink {
        CsvSink::new(self.path_for(key))
    }
}

/// Writes a series to a single CSV file.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSink for CsvSink {
    type Output = PersistOutcome;

    async fn write(&self, data: &NormalizedSeries) -> Result<Self::Output, SinkError> {
        if data.is_empty() {
            info!(symbol = %data.symbol, "no records; skipping write");
            return Ok(PersistOutcome::NoData);
        }

        let bytes = encode_records(&data.records).context(EncodeSnafu)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context(IoSnafu { path: parent })?;
        }

        let tmp = self.path.with_extension("csv.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .context(IoSnafu { path: tmp.clone() })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .context(IoSnafu { path: self.path.clone() })?;

        info!(
            symbol = %data.symbol,
            records = data.len(),
            path = %self.path.display(),
            "wrote series"
        );
        Ok(PersistOutcome::Written {
            path: self.path.clone(),
            records: data.len(),
        })
    }
}

/// Encodes records as CSV with a `timestamp,open,high,low,close,volume` header.
pub fn encode_records(records: &[BarRecord]) -> std::result::Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

pub fn read_records<R: Read>(reader: R) -> std::result::Result<Vec<BarRecord>, csv::Error> {
    csv::Reader::from_reader(reader).deserialize().collect()
}
