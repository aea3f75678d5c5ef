//! Report output port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::comparison::ComparisonRow;
use crate::domain::error::RsrsError;
use crate::domain::indicator::IndicatorSample;
use crate::domain::score_analysis::ScoreAnalysis;
use crate::domain::sweep::SweepReport;

/// Port for exporting results to plotting and reporting tools.
///
/// `name` identifies the run (typically the market) and prefixes every
/// artifact written for it.
pub trait ReportPort {
    fn write_indicators(
        &self,
        name: &str,
        samples: &[IndicatorSample],
        slope_mean: &[Option<f64>],
    ) -> Result<(), RsrsError>;

    /// Equity and benchmark curves plus the trade list.
    fn write_backtest(&self, name: &str, result: &BacktestResult) -> Result<(), RsrsError>;

    fn write_costs(&self, name: &str, results: &[BacktestResult]) -> Result<(), RsrsError>;

    fn write_sweep(&self, name: &str, report: &SweepReport) -> Result<(), RsrsError>;

    fn write_analysis(&self, name: &str, analysis: &ScoreAnalysis) -> Result<(), RsrsError>;

    fn write_comparison(&self, name: &str, rows: &[ComparisonRow]) -> Result<(), RsrsError>;
}
