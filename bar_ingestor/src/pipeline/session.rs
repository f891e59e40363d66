//! Exchange-local trading session window and calendar-day bounds.

use chrono::{
    DateTime, Duration, NaiveDateTime, NaiveTime, TimeZone, Utc, offset::LocalResult,
};
use chrono_tz::{America::New_York, Tz};
use serde::{Deserialize, Serialize};

use crate::models::{BarSeries, DateRange};

const fn hms(hour: u32, min: u32, sec: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, min, sec) {
        Some(t) => t,
        None => panic!("time of day out of range"),
    }
}

const DEFAULT_OPEN: NaiveTime = hms(9, 0, 0);
const DEFAULT_CLOSE: NaiveTime = hms(16, 30, 0);
const LAST_SECOND: NaiveTime = hms(23, 59, 59);

/// Time-of-day window, in the exchange's own time zone, that intraday bars
/// must fall inside. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub tz: Tz,
}

impl Default for SessionWindow {
    /// 09:00 to 16:30 New York time: the regular session plus a margin on
    /// either side.
    fn default() -> Self {
        Self {
            open: DEFAULT_OPEN,
            close: DEFAULT_CLOSE,
            tz: New_York,
        }
    }
}

impl SessionWindow {
    /// True if `ts` falls inside the window on its local calendar day.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        let local = ts.with_timezone(&self.tz).time();
        self.open <= local && local <= self.close
    }

    /// Drops every bar outside the window, keeping order.
    pub fn filter(&self, mut series: BarSeries) -> BarSeries {
        series.bars.retain(|bar| self.contains(bar.timestamp));
        series
    }

    /// UTC instants for `start 00:00:00` through `end 23:59:59`, local time.
    pub fn day_bounds(&self, range: &DateRange) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = resolve_local(self.tz, range.start().and_time(NaiveTime::MIN));
        let end = resolve_local(self.tz, range.end().and_time(LAST_SECOND));
        (start, end)
    }
}

/// Maps a local wall-clock time to UTC. Ambiguous times take the earlier
/// instant; times inside a DST gap move forward to the first valid minute.
fn resolve_local(tz: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let mut t = naive;
            for _ in 0..120 {
                t += Duration::minutes(1);
                if let Some(dt) = tz.from_local_datetime(&t).earliest() {
                    return dt.with_timezone(&Utc);
                }
            }
            // Not reachable for real zones; gaps are at most two hours.
            tz.from_utc_datetime(&naive).with_timezone(&Utc)
        }
    }
}
