//! Splits a date range into chunk-sized sub-ranges, newest first.

use std::iter::FusedIterator;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::DateRange;

/// When the backwards walk stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Continue while the next chunk end is on or after `start`. The emitted
    /// chunks tile the whole range.
    #[default]
    Inclusive,
    /// Continue while the next chunk end is strictly after `start`. A final
    /// single-day chunk at `start` can be left uncovered.
    Exclusive,
}

impl BoundaryPolicy {
    fn continues(self, current_end: NaiveDate, start: NaiveDate) -> bool {
        match self {
            BoundaryPolicy::Inclusive => current_end >= start,
            BoundaryPolicy::Exclusive => current_end > start,
        }
    }
}

/// Lazy sequence of chunk ranges in descending order.
///
/// Each item spans at most `chunk_size_days + 1` calendar days
/// (`end - start <= chunk_size_days`). The plan is consumed by value and
/// cannot be restarted.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    start: NaiveDate,
    next_end: Option<NaiveDate>,
    chunk_days: u64,
    boundary: BoundaryPolicy,
}

/// Plans the chunks for `range`, starting from its end and walking back.
///
/// `chunk_size_days = 0` yields one chunk per calendar day; a chunk size at
/// least as wide as the range yields a single chunk.
pub fn plan(range: DateRange, chunk_size_days: u32, boundary: BoundaryPolicy) -> ChunkPlan {
    ChunkPlan {
        start: range.start(),
        next_end: Some(range.end()),
        chunk_days: u64::from(chunk_size_days),
        boundary,
    }
}

impl Iterator for ChunkPlan {
    type Item = DateRange;

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.next_end?;
        if !self.boundary.continues(end, self.start) {
            self.next_end = None;
            return None;
        }

        let chunk_start = end
            .checked_sub_days(Days::new(self.chunk_days))
            .map_or(self.start, |d| d.max(self.start));
        self.next_end = chunk_start.pred_opt();

        Some(DateRange::new_unchecked(chunk_start, end))
    }
}

impl FusedIterator for ChunkPlan {}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn chunks(
        start: NaiveDate,
        end: NaiveDate,
        size: u32,
        boundary: BoundaryPolicy,
    ) -> Vec<(NaiveDate, NaiveDate)> {
        plan(DateRange::new(start, end).unwrap(), size, boundary)
            .map(|r| (r.start(), r.end()))
            .collect()
    }

    #[test]
    fn walks_backwards_from_end() {
        let got = chunks(d(2024, 1, 1), d(2024, 1, 8), 1, BoundaryPolicy::Inclusive);
        assert_eq!(
            got,
            vec![
                (d(2024, 1, 7), d(2024, 1, 8)),
                (d(2024, 1, 5), d(2024, 1, 6)),
                (d(2024, 1, 3), d(2024, 1, 4)),
                (d(2024, 1, 1), d(2024, 1, 2)),
            ]
        );
    }

    #[test]
    fn last_chunk_is_clamped_to_start() {
        let got = chunks(d(2024, 1, 2), d(2024, 1, 8), 2, BoundaryPolicy::Inclusive);
        assert_eq!(
            got,
            vec![
                (d(2024, 1, 6), d(2024, 1, 8)),
                (d(2024, 1, 3), d(2024, 1, 5)),
                (d(2024, 1, 2), d(2024, 1, 2)),
            ]
        );
    }

    #[test]
    fn wide_chunk_covers_range_once() {
        let got = chunks(d(2024, 1, 1), d(2024, 1, 31), 30, BoundaryPolicy::Inclusive);
        assert_eq!(got, vec![(d(2024, 1, 1), d(2024, 1, 31))]);

        let got = chunks(d(2024, 1, 1), d(2024, 1, 31), 365, BoundaryPolicy::Inclusive);
        assert_eq!(got, vec![(d(2024, 1, 1), d(2024, 1, 31))]);
    }

    #[test]
    fn zero_chunk_size_is_one_day_each() {
        let got = chunks(d(2024, 1, 1), d(2024, 1, 3), 0, BoundaryPolicy::Inclusive);
        assert_eq!(
            got,
            vec![
                (d(2024, 1, 3), d(2024, 1, 3)),
                (d(2024, 1, 2), d(2024, 1, 2)),
                (d(2024, 1, 1), d(2024, 1, 1)),
            ]
        );
    }

    #[test]
    fn single_day_range() {
        let day = d(2024, 3, 15);
        assert_eq!(chunks(day, day, 1, BoundaryPolicy::Inclusive), vec![(day, day)]);
        assert!(chunks(day, day, 1, BoundaryPolicy::Exclusive).is_empty());
    }

    #[test]
    fn exclusive_boundary_can_skip_the_start_day() {
        // 01..05 with size 1: [04,05], [02,03], then current_end == start stops.
        let got = chunks(d(2024, 1, 1), d(2024, 1, 5), 1, BoundaryPolicy::Exclusive);
        assert_eq!(
            got,
            vec![(d(2024, 1, 4), d(2024, 1, 5)), (d(2024, 1, 2), d(2024, 1, 3))]
        );

        let inclusive = chunks(d(2024, 1, 1), d(2024, 1, 5), 1, BoundaryPolicy::Inclusive);
        assert_eq!(inclusive.last(), Some(&(d(2024, 1, 1), d(2024, 1, 1))));
    }

    #[test]
    fn plan_is_fused() {
        let day = d(2024, 1, 1);
        let mut plan = plan(DateRange::new(day, day).unwrap(), 1, BoundaryPolicy::Inclusive);
        assert!(plan.next().is_some());
        assert!(plan.next().is_none());
        assert!(plan.next().is_none());
    }

    #[test]
    fn boundary_policy_parses_from_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            boundary: BoundaryPolicy,
        }
        let w: Wrapper = toml::from_str("boundary = \"exclusive\"").unwrap();
        assert_eq!(w.boundary, BoundaryPolicy::Exclusive);
        assert_eq!(BoundaryPolicy::default(), BoundaryPolicy::Inclusive);
    }

    mod prop {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn inclusive_chunks_tile_the_range(
                offset in 0u32..3_000,
                span in 0u32..400,
                size in 0u32..40,
            ) {
                let start = d(2015, 1, 1) + Days::new(u64::from(offset));
                let end = start + Days::new(u64::from(span));
                let mut ranges = chunks(start, end, size, BoundaryPolicy::Inclusive);

                // descending on the way out
                prop_assert!(ranges.windows(2).all(|w| w[0].0 > w[1].1));

                ranges.sort();
                prop_assert_eq!(ranges.first().map(|r| r.0), Some(start));
                prop_assert_eq!(ranges.last().map(|r| r.1), Some(end));
                for (s, e) in &ranges {
                    prop_assert!(s <= e);
                    prop_assert!((*e - *s).num_days() <= i64::from(size));
                }
                for w in ranges.windows(2) {
                    prop_assert_eq!(w[0].1.succ_opt(), Some(w[1].0));
                }
            }
        }
    }
}
