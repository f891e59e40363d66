//! Date ranges and the per-request fetch unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{errors::Error, models::resolution::Resolution};

/// A closed, inclusive range of calendar dates: `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub(crate) fn new_unchecked(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    pub const fn end(&self) -> NaiveDate {
        self.end
    }
}

/// One fetch unit: a symbol, a date sub-range, and a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSpec {
    pub symbol: String,
    pub range: DateRange,
    pub resolution: Resolution,
}
