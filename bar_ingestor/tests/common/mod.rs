#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::Path,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use bar_ingestor::{
    ExecutionMode, PipelineConfig,
    models::{Bar, BarSeries, BarsRequestParams, Resolution},
    providers::{ApiSnafu, DataProvider, ProviderError},
};
use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveDate, TimeZone, Utc, Weekday};

type FailWhen = Box<dyn Fn(&BarsRequestParams) -> bool + Send + Sync>;

/// In-memory provider returning the stored bars that fall inside each request.
pub struct MockProvider {
    bars: HashMap<Resolution, Vec<Bar>>,
    fail_when: FailWhen,
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: Mutex<Vec<BarsRequestParams>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            bars: HashMap::new(),
            fail_when: Box::new(|_| false),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, resolution: Resolution, bars: Vec<Bar>) -> Self {
        self.bars.insert(resolution, bars);
        self
    }

    pub fn failing_when(
        mut self,
        pred: impl Fn(&BarsRequestParams) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.fail_when = Box::new(pred);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<BarsRequestParams> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(params.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if (self.fail_when)(&params) {
            return ApiSnafu {
                status: 503u16,
                message: "service unavailable",
            }
            .fail();
        }

        let bars = self
            .bars
            .get(&params.resolution)
            .map(|bars| {
                bars.iter()
                    .filter(|b| params.start <= b.timestamp && b.timestamp <= params.end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(BarSeries {
            symbol: params.symbol,
            resolution: params.resolution,
            bars,
        })
    }
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn bar(timestamp: DateTime<Utc>, close: f64) -> Bar {
    Bar {
        timestamp,
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000,
        trade_count: Some(10),
        vwap: Some(close),
    }
}

/// One daily bar per weekday, stamped at New York midnight in winter (05:00Z).
pub fn weekday_daily_bars(start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .enumerate()
        .map(|(i, day)| {
            let ts = Utc.from_utc_datetime(&day.and_hms_opt(5, 0, 0).unwrap());
            bar(ts, 470.0 + i as f64)
        })
        .collect()
}

/// Minute bars every 30 minutes across a whole UTC day.
pub fn half_hourly_bars(day: NaiveDate) -> Vec<Bar> {
    let midnight = Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap());
    (0..48)
        .map(|i| bar(midnight + ChronoDuration::minutes(30 * i), 400.0 + i as f64))
        .collect()
}

pub fn config(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        output_dir: dir.to_path_buf(),
        execution: ExecutionMode::Sequential {
            request_delay_ms: 0,
        },
        ..Default::default()
    }
}
