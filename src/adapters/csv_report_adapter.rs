//! CSV report adapter.
//!
//! Every artifact is written to `<dir>/<name>_<kind>.csv` with a header row.
//! Undefined values (warmup scores, undefined ratios) are left empty.

use crate::domain::backtest::BacktestResult;
use crate::domain::comparison::ComparisonRow;
use crate::domain::error::RsrsError;
use crate::domain::indicator::IndicatorSample;
use crate::domain::score_analysis::ScoreAnalysis;
use crate::domain::sweep::SweepReport;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvReportAdapter {
    dir: PathBuf,
}

#[derive(Serialize)]
struct IndicatorRow {
    date: NaiveDate,
    slope: f64,
    r_squared: f64,
    raw_score: f64,
    standardized_score: Option<f64>,
    adjusted_score: Option<f64>,
    slope_mean: Option<f64>,
}

#[derive(Serialize)]
struct EquityRow {
    date: NaiveDate,
    nav: f64,
    benchmark: f64,
}

#[derive(Serialize)]
struct SummaryRow {
    cost_bps: f64,
    cumulative_return: f64,
    annualized_return: f64,
    max_drawdown: f64,
    sharpe_ratio: Option<f64>,
    win_rate: f64,
    turnover: f64,
    position_changes: usize,
    trades: usize,
    final_nav: f64,
    excess_return: f64,
}

impl SummaryRow {
    fn new(result: &BacktestResult) -> Self {
        Self {
            cost_bps: result.cost_bps,
            cumulative_return: result.cumulative_return,
            annualized_return: result.annualized_return,
            max_drawdown: result.max_drawdown,
            sharpe_ratio: result.sharpe_ratio,
            win_rate: result.win_rate,
            turnover: result.turnover,
            position_changes: result.position_changes,
            trades: result.trades.len(),
            final_nav: result.final_nav(),
            excess_return: result.excess_return(),
        }
    }
}

#[derive(Serialize)]
struct SweepRow {
    n: usize,
    m: usize,
    s1: f64,
    s2: f64,
    cost_bps: f64,
    cumulative_return: Option<f64>,
    annualized_return: Option<f64>,
    max_drawdown: Option<f64>,
    sharpe_ratio: Option<f64>,
    excess_return: Option<f64>,
    position_changes: Option<usize>,
    error: Option<String>,
}

#[derive(Serialize)]
struct StatisticRow {
    statistic: &'static str,
    value: Option<f64>,
}

#[derive(Serialize)]
struct ComparisonCsvRow<'a> {
    name: &'a str,
    final_nav: Option<f64>,
    benchmark_nav: Option<f64>,
    excess_return: Option<f64>,
    cumulative_return: Option<f64>,
    sharpe_ratio: Option<f64>,
    trades: usize,
    error: Option<String>,
}

impl CsvReportAdapter {
    /// Creates `dir` if it does not exist.
    pub fn new(dir: PathBuf) -> Result<Self, RsrsError> {
        fs::create_dir_all(&dir).map_err(|e| RsrsError::Io {
            reason: format!("cannot create output directory {}: {}", dir.display(), e),
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, name: &str, kind: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.csv", name, kind))
    }

    fn write_rows<T: Serialize>(
        &self,
        name: &str,
        kind: &str,
        rows: impl IntoIterator<Item = T>,
    ) -> Result<(), RsrsError> {
        let mut wtr = csv::Writer::from_path(self.artifact_path(name, kind))?;
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_indicators(
        &self,
        name: &str,
        samples: &[IndicatorSample],
        slope_mean: &[Option<f64>],
    ) -> Result<(), RsrsError> {
        let rows = samples.iter().enumerate().map(|(i, s)| IndicatorRow {
            date: s.date,
            slope: s.slope,
            r_squared: s.r_squared,
            raw_score: s.raw_score,
            standardized_score: s.standardized_score,
            adjusted_score: s.adjusted_score,
            slope_mean: slope_mean.get(i).copied().flatten(),
        });
        self.write_rows(name, "indicators", rows)
    }

    fn write_backtest(&self, name: &str, result: &BacktestResult) -> Result<(), RsrsError> {
        let equity = result
            .equity_curve
            .iter()
            .zip(&result.benchmark_curve)
            .map(|(nav, bench)| EquityRow {
                date: nav.date,
                nav: nav.nav,
                benchmark: bench.nav,
            });
        self.write_rows(name, "equity", equity)?;
        self.write_rows(name, "trades", &result.trades)
    }

    fn write_costs(&self, name: &str, results: &[BacktestResult]) -> Result<(), RsrsError> {
        self.write_rows(name, "costs", results.iter().map(SummaryRow::new))
    }

    fn write_sweep(&self, name: &str, report: &SweepReport) -> Result<(), RsrsError> {
        let rows = report.entries().iter().map(|entry| {
            let ok = entry.outcome.as_ref().ok();
            SweepRow {
                n: entry.point.n,
                m: entry.point.m,
                s1: entry.point.s1,
                s2: entry.point.s2,
                cost_bps: entry.point.cost_bps,
                cumulative_return: ok.map(|r| r.cumulative_return),
                annualized_return: ok.map(|r| r.annualized_return),
                max_drawdown: ok.map(|r| r.max_drawdown),
                sharpe_ratio: ok.and_then(|r| r.sharpe_ratio),
                excess_return: ok.map(|r| r.excess_return()),
                position_changes: ok.map(|r| r.position_changes),
                error: entry.outcome.as_ref().err().map(|e| e.to_string()),
            }
        });
        self.write_rows(name, "sweep", rows)
    }

    /// Writes the forward observations, the score bins and a statistics table.
    fn write_analysis(&self, name: &str, analysis: &ScoreAnalysis) -> Result<(), RsrsError> {
        self.write_rows(name, "forward_returns", &analysis.observations)?;
        self.write_rows(name, "score_bins", &analysis.bins)?;

        let dist = analysis.distribution.as_ref();
        let statistics = [
            ("count", dist.map(|d| d.count as f64)),
            ("mean", dist.map(|d| d.mean)),
            ("std", dist.map(|d| d.std)),
            ("skewness", dist.and_then(|d| d.skewness)),
            ("excess_kurtosis", dist.and_then(|d| d.excess_kurtosis)),
            ("return_corr_right", analysis.expected_return.right),
            ("return_corr_left", analysis.expected_return.left),
            ("return_corr_total", analysis.expected_return.total),
            ("up_corr_right", analysis.up_probability.right),
            ("up_corr_left", analysis.up_probability.left),
            ("up_corr_total", analysis.up_probability.total),
        ];
        self.write_rows(
            name,
            "score_statistics",
            statistics
                .into_iter()
                .map(|(statistic, value)| StatisticRow { statistic, value }),
        )
    }

    fn write_comparison(&self, name: &str, rows: &[ComparisonRow]) -> Result<(), RsrsError> {
        let rows = rows.iter().map(|row| {
            let ok = row.outcome.as_ref().ok();
            ComparisonCsvRow {
                name: &row.name,
                final_nav: ok.map(|r| r.final_nav()),
                benchmark_nav: ok.map(|r| r.final_benchmark_nav()),
                excess_return: ok.map(|r| r.excess_return()),
                cumulative_return: ok.map(|r| r.cumulative_return),
                sharpe_ratio: ok.and_then(|r| r.sharpe_ratio),
                trades: row.trade_count(),
                error: row.outcome.as_ref().err().map(|e| e.to_string()),
            }
        });
        self.write_rows(name, "comparison", rows)
    }
}
