//! Merges chunk results into one ordered, duplicate-free series.

use crate::models::{BarRecord, BarSeries, NormalizedSeries, Resolution};

/// Concatenates `chunks` (in plan order), sorts by timestamp and drops
/// repeated timestamps.
///
/// The sort is stable, so when two chunks overlap at a seam the bar from the
/// chunk planned first wins. Prices are narrowed to `f32` and volume to `i32`.
pub fn aggregate<I>(symbol: &str, resolution: Resolution, chunks: I) -> NormalizedSeries
where
    I: IntoIterator<Item = BarSeries>,
{
    let mut bars: Vec<_> = chunks
        .into_iter()
        .filter(|chunk| !chunk.is_empty())
        .flat_map(|chunk| chunk.bars)
        .collect();

    bars.sort_by_key(|bar| bar.timestamp);
    bars.dedup_by_key(|bar| bar.timestamp);

    NormalizedSeries {
        symbol: symbol.to_string(),
        resolution,
        records: bars.iter().map(BarRecord::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;
    use crate::models::Bar;

    fn ts(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap() + Duration::minutes(minute)
    }

    fn bar(minute: i64, close: f64) -> Bar {
        Bar {
            timestamp: ts(minute),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100,
            trade_count: None,
            vwap: None,
        }
    }

    fn chunk(bars: Vec<Bar>) -> BarSeries {
        BarSeries {
            symbol: "SPY".to_string(),
            resolution: Resolution::Minute,
            bars,
        }
    }

    #[test]
    fn newest_first_chunks_come_out_ascending() {
        let series = aggregate(
            "SPY",
            Resolution::Minute,
            vec![
                chunk(vec![bar(10, 3.0), bar(11, 4.0)]),
                chunk(vec![bar(0, 1.0), bar(1, 2.0)]),
            ],
        );
        let closes: Vec<f32> = series.records.iter().map(|r| r.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn first_planned_chunk_wins_on_duplicate_timestamp() {
        let series = aggregate(
            "SPY",
            Resolution::Minute,
            vec![
                chunk(vec![bar(5, 50.0), bar(6, 60.0)]),
                chunk(vec![bar(4, 40.0), bar(5, -1.0)]),
            ],
        );
        assert_eq!(series.len(), 3);
        assert_eq!(series.records[1].timestamp, ts(5));
        assert_eq!(series.records[1].close, 50.0);
    }

    #[test]
    fn empty_input_gives_empty_series() {
        let series = aggregate("SPY", Resolution::Day, vec![chunk(vec![]), chunk(vec![])]);
        assert!(series.is_empty());
        assert_eq!(series.symbol, "SPY");
        assert_eq!(series.resolution, Resolution::Day);
    }

    mod prop {
        use std::collections::BTreeSet;

        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn output_is_strictly_ascending_union(
                chunks in proptest::collection::vec(
                    proptest::collection::vec(0i64..500, 0..40),
                    0..8,
                ),
            ) {
                let expected: BTreeSet<_> = chunks.iter().flatten().map(|m| ts(*m)).collect();
                let input = chunks
                    .iter()
                    .map(|minutes| chunk(minutes.iter().map(|m| bar(*m, *m as f64)).collect()));

                let series = aggregate("SPY", Resolution::Minute, input);

                prop_assert!(series.records.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
                let got: BTreeSet<_> = series.records.iter().map(|r| r.timestamp).collect();
                prop_assert_eq!(got, expected);
            }
        }
    }
}
