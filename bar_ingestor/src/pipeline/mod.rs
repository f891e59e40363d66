//! The ingestion pipeline: plan → fetch → aggregate → persist.
//!
//! A [`Pipeline`] turns one [`FetchRequest`] into one CSV artifact. The
//! artifact is the cache: if it already exists the provider is never called.
//! Otherwise the date range is split into chunks (see [`planner`]), each
//! chunk is fetched independently (failures are logged and skipped), and the
//! surviving bars are merged into a single ascending series before being
//! written.

pub mod aggregate;
pub mod fetcher;
pub mod planner;
pub mod session;

use std::{fmt, path::PathBuf, sync::Arc, time::Duration};

use chrono::NaiveDate;
use futures::{StreamExt, stream};
use tracing::info;

pub use aggregate::aggregate;
pub use fetcher::{ChunkFetcher, ChunkOutcome};
pub use planner::{BoundaryPolicy, ChunkPlan, plan};
pub use session::SessionWindow;

use crate::{
    config::{ExecutionMode, PipelineConfig},
    errors::{Error, Result},
    io::{CacheKey, CsvCache, DataSink, PersistOutcome},
    models::{ChunkSpec, DateRange, NormalizedSeries, Resolution},
    providers::DataProvider,
};

/// One acquisition job: a symbol over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub symbol: String,
    pub range: DateRange,
    pub resolution: Resolution,
}

impl FetchRequest {
    /// Validates the range and normalises the symbol to upper case.
    pub fn new(
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        resolution: Resolution,
    ) -> Result<Self> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(Error::Config("symbol must not be empty".to_string()));
        }
        // The symbol becomes part of the artifact file name.
        if !symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-')
        {
            return Err(Error::Config(format!(
                "invalid symbol '{symbol}': expected letters, digits, '.' or '-'"
            )));
        }
        Ok(Self {
            symbol,
            range: DateRange::new(start, end)?,
            resolution,
        })
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            symbol: self.symbol.clone(),
            range: self.range,
            resolution: self.resolution,
        }
    }

    pub fn with_resolution(&self, resolution: Resolution) -> Self {
        Self {
            resolution,
            ..self.clone()
        }
    }
}

/// Where the returned series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesSource {
    Cache,
    Provider,
}

/// What happened to the artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// An existing artifact was returned untouched.
    Cached { path: PathBuf },
    Written { path: PathBuf, records: usize },
    /// Nothing was fetched, so nothing was written.
    NoData,
}

impl Artifact {
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Artifact::Cached { path } | Artifact::Written { path, .. } => Some(path),
            Artifact::NoData => None,
        }
    }
}

/// Per-run chunk accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub planned: usize,
    pub fetched: usize,
    pub empty: usize,
    pub failed: usize,
    pub records: usize,
}

impl FetchReport {
    fn tally(&mut self, outcome: &ChunkOutcome) {
        match outcome {
            ChunkOutcome::Fetched(_) => self.fetched += 1,
            ChunkOutcome::NoData => self.empty += 1,
            ChunkOutcome::Failed(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for FetchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} chunks planned: {} fetched, {} empty, {} failed; {} records",
            self.planned, self.fetched, self.empty, self.failed, self.records
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    /// Key of the series actually returned (the daily key after a fallback).
    pub key: CacheKey,
    pub series: NormalizedSeries,
    pub source: SeriesSource,
    pub artifact: Artifact,
    pub report: FetchReport,
}

pub struct Pipeline {
    fetcher: ChunkFetcher,
    cache: CsvCache,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(provider: Arc<dyn DataProvider>, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fetcher: ChunkFetcher::new(provider, &config),
            cache: CsvCache::new(config.output_dir.clone()),
            config,
        })
    }

    /// Runs the request, falling back to daily bars when enabled and the
    /// minute run produced nothing.
    pub async fn run(&self, request: &FetchRequest) -> Result<PipelineOutcome> {
        let outcome = self.run_once(request).await?;

        if self.config.fallback_to_daily
            && request.resolution == Resolution::Minute
            && outcome.series.is_empty()
        {
            info!(symbol = %request.symbol, "no minute data; falling back to daily bars");
            return self
                .run_once(&request.with_resolution(Resolution::Day))
                .await;
        }

        Ok(outcome)
    }

    async fn run_once(&self, request: &FetchRequest) -> Result<PipelineOutcome> {
        let key = request.cache_key();

        if let Some(series) = self.cache.load(&key).await? {
            let path = self.cache.path_for(&key);
            info!(
                symbol = %key.symbol,
                path = %path.display(),
                records = series.len(),
                "using cached series"
            );
            return Ok(PipelineOutcome {
                key,
                report: FetchReport {
                    records: series.len(),
                    ..Default::default()
                },
                series,
                source: SeriesSource::Cache,
                artifact: Artifact::Cached { path },
            });
        }

        let chunks: Vec<ChunkSpec> = plan(
            request.range,
            self.config.chunk_size_days,
            self.config.boundary,
        )
        .map(|range| ChunkSpec {
            symbol: request.symbol.clone(),
            range,
            resolution: request.resolution,
        })
        .collect();
        info!(
            symbol = %request.symbol,
            resolution = %request.resolution,
            start = %request.range.start(),
            end = %request.range.end(),
            chunks = chunks.len(),
            "planned fetch"
        );

        let outcomes = match self.config.execution {
            ExecutionMode::Sequential { request_delay_ms } => {
                self.fetch_sequential(&chunks, Duration::from_millis(request_delay_ms))
                    .await
            }
            ExecutionMode::Parallel { max_workers } => {
                self.fetch_parallel(&chunks, max_workers).await
            }
        };

        let mut report = FetchReport {
            planned: chunks.len(),
            ..Default::default()
        };
        for outcome in &outcomes {
            report.tally(outcome);
        }

        let series = aggregate(
            &request.symbol,
            request.resolution,
            outcomes.into_iter().filter_map(ChunkOutcome::into_series),
        );
        report.records = series.len();
        info!(symbol = %request.symbol, %report, "fetch complete");

        let artifact = match self.cache.sink(&key).write(&series).await? {
            PersistOutcome::Written { path, records } => Artifact::Written { path, records },
            PersistOutcome::NoData => Artifact::NoData,
        };

        Ok(PipelineOutcome {
            key,
            series,
            source: SeriesSource::Provider,
            artifact,
            report,
        })
    }

    async fn fetch_sequential(&self, chunks: &[ChunkSpec], delay: Duration) -> Vec<ChunkOutcome> {
        let mut outcomes = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            outcomes.push(self.fetcher.fetch(chunk).await);
        }
        outcomes
    }

    /// Fetches with at most `max_workers` requests in flight and returns the
    /// outcomes in plan order.
    async fn fetch_parallel(&self, chunks: &[ChunkSpec], max_workers: usize) -> Vec<ChunkOutcome> {
        let fetcher = &self.fetcher;
        let mut indexed: Vec<(usize, ChunkOutcome)> = stream::iter(chunks.iter().enumerate())
            .map(move |(idx, chunk)| async move { (idx, fetcher.fetch(chunk).await) })
            .buffer_unordered(max_workers.max(1))
            .collect()
            .await;
        indexed.sort_by_key(|(idx, _)| *idx);
        indexed.into_iter().map(|(_, outcome)| outcome).collect()
    }
}
