#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use rsrs::domain::backtest::BacktestResult;
use rsrs::domain::comparison::ComparisonRow;
use rsrs::domain::error::RsrsError;
use rsrs::domain::indicator::IndicatorSample;
pub use rsrs::domain::ohlcv::PricePoint;
use rsrs::domain::score_analysis::ScoreAnalysis;
use rsrs::domain::series::SeriesStore;
use rsrs::domain::signal::{Position, Signal};
use rsrs::domain::sweep::SweepReport;
use rsrs::ports::data_port::PricePort;
use rsrs::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockPricePort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, RsrsError>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_points(mut self, source: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(source.to_string(), points);
        self
    }

    pub fn with_error(mut self, source: &str, error: RsrsError) -> Self {
        self.errors.insert(source.to_string(), error);
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_series(
        &self,
        source: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<SeriesStore, RsrsError> {
        if let Some(err) = self.errors.get(source) {
            return Err(err.clone());
        }
        let points = self.data.get(source).cloned().ok_or_else(|| RsrsError::Io {
            reason: format!("no such source {}", source),
        })?;
        Ok(SeriesStore::new(points)?.between(start, end))
    }
}

/// Records `name:kind` for every artifact written.
#[derive(Default)]
pub struct RecordingReportPort {
    pub written: RefCell<Vec<String>>,
}

impl RecordingReportPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> Vec<String> {
        self.written.borrow().clone()
    }

    fn record(&self, name: &str, kind: &str) -> Result<(), RsrsError> {
        self.written.borrow_mut().push(format!("{}:{}", name, kind));
        Ok(())
    }
}

impl ReportPort for RecordingReportPort {
    fn write_indicators(
        &self,
        name: &str,
        _samples: &[IndicatorSample],
        _slope_mean: &[Option<f64>],
    ) -> Result<(), RsrsError> {
        self.record(name, "indicators")
    }

    fn write_backtest(&self, name: &str, _result: &BacktestResult) -> Result<(), RsrsError> {
        self.record(name, "backtest")
    }

    fn write_costs(&self, name: &str, _results: &[BacktestResult]) -> Result<(), RsrsError> {
        self.record(name, "costs")
    }

    fn write_sweep(&self, name: &str, _report: &SweepReport) -> Result<(), RsrsError> {
        self.record(name, "sweep")
    }

    fn write_analysis(&self, name: &str, _analysis: &ScoreAnalysis) -> Result<(), RsrsError> {
        self.record(name, "analysis")
    }

    fn write_comparison(&self, name: &str, _rows: &[ComparisonRow]) -> Result<(), RsrsError> {
        self.record(name, "comparison")
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn day(i: usize) -> NaiveDate {
    date(2010, 1, 1) + Duration::days(i as i64)
}

fn bar(i: usize, high: f64, low: f64, close: f64, volume: f64) -> PricePoint {
    PricePoint {
        date: day(i),
        open: close,
        high,
        low,
        close,
        volume,
    }
}

/// Highs that oscillate and drift; lows exactly `a * high + b`.
pub fn linear_points(len: usize, a: f64, b: f64) -> Vec<PricePoint> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            let high = 100.0 + 10.0 * (t * 0.3).sin() + 0.05 * t;
            let low = a * high + b;
            bar(i, high, low, (high + low) / 2.0, 1_000.0)
        })
        .collect()
}

pub fn constant_points(len: usize, price: f64) -> Vec<PricePoint> {
    (0..len)
        .map(|i| bar(i, price * 1.01, price * 0.99, price, 1_000.0))
        .collect()
}

/// Close compounding at `daily` per day from 100.
pub fn rising_points(len: usize, daily: f64) -> Vec<PricePoint> {
    (0..len)
        .map(|i| {
            let close = 100.0 * (1.0 + daily).powi(i as i32);
            bar(i, close * 1.01, close * 0.99, close, 1_000.0)
        })
        .collect()
}

/// Trending, cycling prices with a varying high/low spread.
pub fn wavy_points(len: usize) -> Vec<PricePoint> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            let close = 50.0 + (t * 0.05).sin() * 8.0 + (t * 0.21).cos() * 2.0 + t * 0.01;
            let up = 0.6 + (t * 0.37).sin().abs() * 0.9;
            let down = 0.6 + (t * 0.13).cos().abs() * 0.9;
            let volume = 1_000.0 + (t * 0.11).sin() * 400.0;
            bar(i, close + up, close - down, close, volume)
        })
        .collect()
}

pub fn series(points: Vec<PricePoint>) -> SeriesStore {
    SeriesStore::new(points).unwrap()
}

/// Positions dated on the series' first days.
pub fn positions(series: &SeriesStore, signals: &[Signal]) -> Vec<Position> {
    series
        .points()
        .iter()
        .zip(signals)
        .map(|(p, &signal)| Position {
            date: p.date,
            signal,
            applied_lag_days: 0,
        })
        .collect()
}

/// Alternating LONG/FLAT blocks of `block` days.
pub fn alternating(len: usize, block: usize) -> Vec<Signal> {
    (0..len)
        .map(|i| {
            if (i / block) % 2 == 1 {
                Signal::Long
            } else {
                Signal::Flat
            }
        })
        .collect()
}

/// Samples carrying only the given adjusted scores.
pub fn scored_samples(scores: &[Option<f64>]) -> Vec<IndicatorSample> {
    scores
        .iter()
        .enumerate()
        .map(|(i, &score)| IndicatorSample {
            date: day(i),
            slope: 1.0,
            r_squared: 1.0,
            raw_score: 1.0,
            standardized_score: score,
            adjusted_score: score,
        })
        .collect()
}
