use std::fmt;

use chrono::{DateTime, Utc};

use crate::{models::NormalizedSeries, pipeline::SessionWindow};

/// Human-readable digest of a series, printed by both subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSummary {
    pub symbol: String,
    pub records: usize,
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
    /// Records whose local time of day is inside the session window.
    /// Only set for intraday series.
    pub in_session: Option<usize>,
}

impl SeriesSummary {
    pub fn new(series: &NormalizedSeries, session: &SessionWindow) -> Self {
        Self {
            symbol: series.symbol.clone(),
            records: series.len(),
            first: series.first_timestamp(),
            last: series.last_timestamp(),
            in_session: series.resolution.is_intraday().then(|| {
                series
                    .records
                    .iter()
                    .filter(|r| session.contains(r.timestamp))
                    .count()
            }),
        }
    }
}

impl fmt::Display for SeriesSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} records", self.symbol, self.records)?;
        if let (Some(first), Some(last)) = (self.first, self.last) {
            write!(f, "\nfirst: {}", first.to_rfc3339())?;
            write!(f, "\nlast:  {}", last.to_rfc3339())?;
        }
        if let Some(in_session) = self.in_session {
            write!(f, "\nin market hours: {in_session}")?;
        }
        Ok(())
    }
}
