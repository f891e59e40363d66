//! Fetches one chunk from the provider and classifies the result.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    config::PipelineConfig,
    models::{Adjustment, BarSeries, BarsRequestParams, ChunkSpec, ProviderParams},
    pipeline::session::SessionWindow,
    providers::{DataProvider, alpaca_rest::AlpacaBarsParams},
};

/// What a single chunk produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    Fetched(BarSeries),
    /// The provider answered, but with no bars (or none inside the session).
    NoData,
    /// The provider call failed; the chunk contributes nothing.
    Failed(String),
}

impl ChunkOutcome {
    pub fn into_series(self) -> Option<BarSeries> {
        match self {
            ChunkOutcome::Fetched(series) => Some(series),
            ChunkOutcome::NoData | ChunkOutcome::Failed(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct ChunkFetcher {
    provider: Arc<dyn DataProvider>,
    session: SessionWindow,
    session_filter: bool,
    adjustment: Adjustment,
    row_limit: u32,
    provider_params: ProviderParams,
}

impl ChunkFetcher {
    pub fn new(provider: Arc<dyn DataProvider>, config: &PipelineConfig) -> Self {
        let provider_params = match config.feed {
            Some(feed) => ProviderParams::Alpaca(AlpacaBarsParams {
                feed: Some(feed),
            }),
            None => ProviderParams::None,
        };
        Self {
            provider,
            session: config.session,
            session_filter: config.session_filter,
            adjustment: config.adjustment,
            row_limit: config.row_limit,
            provider_params,
        }
    }

    /// Builds the provider request covering the chunk's local calendar days.
    pub fn request_params(&self, chunk: &ChunkSpec) -> BarsRequestParams {
        let (start, end) = self.session.day_bounds(&chunk.range);
        BarsRequestParams {
            symbol: chunk.symbol.clone(),
            resolution: chunk.resolution,
            start,
            end,
            adjustment: self.adjustment,
            limit: Some(self.row_limit),
            provider_specific: self.provider_params.clone(),
        }
    }

    /// Fetches one chunk. Never fails: provider errors become
    /// [`ChunkOutcome::Failed`].
    pub async fn fetch(&self, chunk: &ChunkSpec) -> ChunkOutcome {
        let params = self.request_params(chunk);
        info!(
            symbol = %chunk.symbol,
            start = %chunk.range.start(),
            end = %chunk.range.end(),
            "fetching chunk"
        );

        let series = match self.provider.fetch_bars(params).await {
            Ok(series) => series,
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    symbol = %chunk.symbol,
                    start = %chunk.range.start(),
                    end = %chunk.range.end(),
                    error = %e,
                    "chunk failed"
                );
                return ChunkOutcome::Failed(e.to_string());
            }
        };

        let series = if self.session_filter && chunk.resolution.is_intraday() {
            self.session.filter(series)
        } else {
            series
        };

        info!(
            symbol = %chunk.symbol,
            start = %chunk.range.start(),
            end = %chunk.range.end(),
            bars = series.len(),
            "chunk done"
        );
        if series.is_empty() {
            ChunkOutcome::NoData
        } else {
            ChunkOutcome::Fetched(series)
        }
    }
}
