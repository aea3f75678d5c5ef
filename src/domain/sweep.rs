//! Parameter sweep over (N, M, S1, S2, cost) grid points.
//!
//! Every point runs the full indicator -> signal -> backtest chain on its own
//! buffers; the price series and the entry gate are shared read-only. A point
//! that fails is recorded with its error and the sweep moves on. Entries are
//! reported in input order whether or not the points ran in parallel.

use crate::domain::backtest::{self, BacktestResult};
use crate::domain::error::RsrsError;
use crate::domain::filter::{EntryFilter, EntryGate};
use crate::domain::indicator::{self, IndicatorMode};
use crate::domain::series::SeriesStore;
use crate::domain::signal;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// One parameter combination.
///
/// Equality and hashing compare the float fields bit for bit so a point can
/// key a map.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GridPoint {
    pub n: usize,
    pub m: usize,
    pub s1: f64,
    pub s2: f64,
    pub cost_bps: f64,
}

impl GridPoint {
    fn key(&self) -> (usize, usize, u64, u64, u64) {
        (
            self.n,
            self.m,
            self.s1.to_bits(),
            self.s2.to_bits(),
            self.cost_bps.to_bits(),
        )
    }
}

impl PartialEq for GridPoint {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for GridPoint {}

impl Hash for GridPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N={} M={} S1={} S2={} cost={}bps",
            self.n, self.m, self.s1, self.s2, self.cost_bps
        )
    }
}

/// Axes whose cartesian product gives the grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterGrid {
    pub windows: Vec<usize>,
    pub zscore_windows: Vec<usize>,
    pub buy_thresholds: Vec<f64>,
    pub sell_thresholds: Vec<f64>,
    pub costs_bps: Vec<f64>,
}

impl ParameterGrid {
    pub fn len(&self) -> usize {
        self.windows.len()
            * self.zscore_windows.len()
            * self.buy_thresholds.len()
            * self.sell_thresholds.len()
            * self.costs_bps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cartesian product, varying the cost fastest and N slowest.
    pub fn points(&self) -> Vec<GridPoint> {
        let mut points = Vec::with_capacity(self.len());
        for &n in &self.windows {
            for &m in &self.zscore_windows {
                for &s1 in &self.buy_thresholds {
                    for &s2 in &self.sell_thresholds {
                        for &cost_bps in &self.costs_bps {
                            points.push(GridPoint {
                                n,
                                m,
                                s1,
                                s2,
                                cost_bps,
                            });
                        }
                    }
                }
            }
        }
        points
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSettings {
    pub mode: IndicatorMode,
    pub lag_days: usize,
    pub filter: EntryFilter,
    pub parallel: bool,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            mode: IndicatorMode::default(),
            lag_days: 1,
            filter: EntryFilter::None,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepEntry {
    pub point: GridPoint,
    pub outcome: Result<BacktestResult, RsrsError>,
}

/// Metric used to rank sweep results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepMetric {
    CumulativeReturn,
    AnnualizedReturn,
    SharpeRatio,
    ExcessReturn,
    MaxDrawdown,
}

impl SweepMetric {
    /// Value to maximize; drawdown is negated. `None` when undefined.
    pub fn score(self, result: &BacktestResult) -> Option<f64> {
        match self {
            SweepMetric::CumulativeReturn => Some(result.cumulative_return),
            SweepMetric::AnnualizedReturn => Some(result.annualized_return),
            SweepMetric::SharpeRatio => result.sharpe_ratio,
            SweepMetric::ExcessReturn => Some(result.excess_return()),
            SweepMetric::MaxDrawdown => Some(-result.max_drawdown),
        }
        .filter(|v| v.is_finite())
    }
}

impl FromStr for SweepMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cumulative_return" => Ok(SweepMetric::CumulativeReturn),
            "annualized_return" => Ok(SweepMetric::AnnualizedReturn),
            "sharpe" | "sharpe_ratio" => Ok(SweepMetric::SharpeRatio),
            "excess_return" => Ok(SweepMetric::ExcessReturn),
            "max_drawdown" => Ok(SweepMetric::MaxDrawdown),
            other => Err(format!("unknown sweep metric '{}'", other)),
        }
    }
}

impl fmt::Display for SweepMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepMetric::CumulativeReturn => write!(f, "cumulative_return"),
            SweepMetric::AnnualizedReturn => write!(f, "annualized_return"),
            SweepMetric::SharpeRatio => write!(f, "sharpe_ratio"),
            SweepMetric::ExcessReturn => write!(f, "excess_return"),
            SweepMetric::MaxDrawdown => write!(f, "max_drawdown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SweepReport {
    entries: Vec<SweepEntry>,
}

impl SweepReport {
    pub fn entries(&self) -> &[SweepEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Outcome of the first entry for `point`.
    pub fn get(&self, point: &GridPoint) -> Option<&Result<BacktestResult, RsrsError>> {
        self.entries
            .iter()
            .find(|e| e.point == *point)
            .map(|e| &e.outcome)
    }

    pub fn successes(&self) -> impl Iterator<Item = (&GridPoint, &BacktestResult)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().ok().map(|r| (&e.point, r)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&GridPoint, &RsrsError)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().err().map(|err| (&e.point, err)))
    }

    /// Best successful point by `metric`; ties keep the earliest point.
    pub fn best_by(&self, metric: SweepMetric) -> Option<(&GridPoint, &BacktestResult)> {
        let mut best: Option<(&GridPoint, &BacktestResult, f64)> = None;
        for (point, result) in self.successes() {
            let Some(value) = metric.score(result) else {
                continue;
            };
            if best.is_none_or(|(_, _, b)| value > b) {
                best = Some((point, result, value));
            }
        }
        best.map(|(point, result, _)| (point, result))
    }

    pub fn into_map(self) -> HashMap<GridPoint, Result<BacktestResult, RsrsError>> {
        self.entries
            .into_iter()
            .map(|e| (e.point, e.outcome))
            .collect()
    }
}

/// Full chain for one point.
pub fn evaluate(
    series: &SeriesStore,
    point: &GridPoint,
    settings: &SweepSettings,
    gate: &EntryGate,
) -> Result<BacktestResult, RsrsError> {
    let samples = indicator::compute(series, point.n, point.m, settings.mode)?;
    let positions =
        signal::generate_gated(&samples, point.s1, point.s2, settings.lag_days, gate)?;
    backtest::run(&positions, series, point.cost_bps)
}

pub fn sweep(series: &SeriesStore, points: &[GridPoint], settings: &SweepSettings) -> SweepReport {
    sweep_interruptible(series, points, settings, &AtomicBool::new(false))
}

/// Like [`sweep`], but points that have not started once `stop` is set are
/// recorded as [`RsrsError::Interrupted`].
///
/// Library entry point for callers that own a cancellation flag; the `rsrs`
/// binary installs no signal handler and runs every sweep through [`sweep`].
pub fn sweep_interruptible(
    series: &SeriesStore,
    points: &[GridPoint],
    settings: &SweepSettings,
    stop: &AtomicBool,
) -> SweepReport {
    info!(
        points = points.len(),
        parallel = settings.parallel,
        mode = %settings.mode.score,
        filter = %settings.filter,
        "starting parameter sweep"
    );
    let gate = EntryGate::build(series, settings.filter);

    let run_point = |point: &GridPoint| -> SweepEntry {
        let outcome = if stop.load(Ordering::Relaxed) {
            Err(RsrsError::Interrupted)
        } else {
            match &gate {
                Ok(gate) => evaluate(series, point, settings, gate),
                Err(err) => Err(err.clone()),
            }
        };
        match &outcome {
            Ok(result) => debug!(
                point = %point,
                cumulative_return = result.cumulative_return,
                "grid point finished"
            ),
            Err(RsrsError::Interrupted) => debug!(point = %point, "grid point skipped"),
            Err(err) => warn!(point = %point, error = %err, "grid point failed"),
        }
        SweepEntry {
            point: *point,
            outcome,
        }
    };

    let report = SweepReport {
        entries: map_points(points, settings.parallel, run_point),
    };
    info!(
        succeeded = report.successes().count(),
        failed = report.failures().count(),
        "parameter sweep finished"
    );
    report
}

#[cfg(feature = "parallel")]
fn map_points<F>(points: &[GridPoint], parallel: bool, f: F) -> Vec<SweepEntry>
where
    F: Fn(&GridPoint) -> SweepEntry + Send + Sync,
{
    if parallel {
        use rayon::prelude::*;
        return points.par_iter().map(f).collect();
    }
    points.iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
fn map_points<F>(points: &[GridPoint], _parallel: bool, f: F) -> Vec<SweepEntry>
where
    F: Fn(&GridPoint) -> SweepEntry,
{
    points.iter().map(f).collect()
}
