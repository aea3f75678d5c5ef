//! Integration tests across the indicator, signal, backtest and sweep chain.
//!
//! Tests cover:
//! - Slope and R² recovery on exactly linear high/low data
//! - Standardization against a naive rolling recomputation and two-slope windows
//! - Backtest idempotence, cost monotonicity and flat-price behavior
//! - Explicit insufficient-history failures
//! - Sweeps that mix valid and failing points; parallel/sequential parity
//! - CLI pipelines driven through mock ports
//! - CSV price files on disk

mod common;

use approx::assert_abs_diff_eq;
use common::*;
use rsrs::adapters::csv_adapter::CsvAdapter;
use rsrs::adapters::file_config_adapter::FileConfigAdapter;
use rsrs::cli::{self, RunConfig};
use rsrs::domain::backtest;
use rsrs::domain::error::RsrsError;
use rsrs::domain::indicator::{self, IndicatorMode, RegressionMode, ScoreMode};
use rsrs::domain::signal::Signal;
use rsrs::domain::sweep::{self, GridPoint, ParameterGrid, SweepMetric, SweepSettings};
use rsrs::ports::data_port::PricePort;

fn run_config(ini: &str) -> RunConfig {
    cli::build_run_config(&FileConfigAdapter::from_string(ini).unwrap()).unwrap()
}

mod indicator_recovery {
    use super::*;

    #[test]
    fn low_on_high_recovers_linear_slope() {
        let s = series(linear_points(120, 0.9, -2.0));
        let mode = IndicatorMode {
            regression: RegressionMode::LowOnHigh,
            score: ScoreMode::Standard,
        };
        let samples = indicator::compute(&s, 18, 10, mode).unwrap();

        assert_eq!(samples.len(), 120 - 17);
        for sample in &samples {
            assert_abs_diff_eq!(sample.slope, 0.9, epsilon = 1e-6);
            assert_abs_diff_eq!(sample.r_squared, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn high_on_low_recovers_inverse_slope() {
        let s = series(linear_points(120, 0.8, 5.0));
        let samples = indicator::compute(&s, 18, 10, IndicatorMode::default()).unwrap();
        for sample in &samples {
            assert_abs_diff_eq!(sample.slope, 1.25, epsilon = 1e-6);
            assert_abs_diff_eq!(sample.r_squared, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn every_window_size_recovers_slope() {
        let s = series(linear_points(200, 0.95, -1.0));
        let mode = IndicatorMode {
            regression: RegressionMode::LowOnHigh,
            score: ScoreMode::Slope,
        };
        for n in [2, 5, 18, 40] {
            let samples = indicator::compute(&s, n, 20, mode).unwrap();
            assert_eq!(samples.first().unwrap().date, day(n - 1));
            for sample in &samples {
                assert_abs_diff_eq!(sample.slope, 0.95, epsilon = 1e-6);
            }
        }
    }
}

mod standardization {
    use super::*;

    fn naive_mean_std(values: &[f64]) -> (f64, f64) {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        (mean, var.sqrt())
    }

    #[test]
    fn scores_match_naive_rolling_recomputation() {
        let m = 60;
        let s = series(wavy_points(400));
        let samples = indicator::compute(&s, 18, m, IndicatorMode::default()).unwrap();
        let slopes: Vec<f64> = samples.iter().map(|x| x.slope).collect();

        for (i, sample) in samples.iter().enumerate() {
            if i + 1 < m {
                assert_eq!(sample.standardized_score, None);
                continue;
            }
            let (mean, std) = naive_mean_std(&slopes[i + 1 - m..=i]);
            let z = sample.standardized_score.unwrap();
            assert_abs_diff_eq!(z, (sample.slope - mean) / std, epsilon = 1e-6);
        }
    }

    #[test]
    fn two_slope_window_scores_are_unit_signed() {
        // Population z of the newer of two values is +1 or -1.
        let s = series(wavy_points(300));
        let samples = indicator::compute(&s, 18, 2, IndicatorMode::default()).unwrap();
        assert_eq!(samples[0].standardized_score, None);

        let mut checked = 0;
        for pair in samples.windows(2) {
            let diff = pair[1].slope - pair[0].slope;
            if diff.abs() < 1e-9 {
                continue;
            }
            let z = pair[1].standardized_score.unwrap();
            assert_abs_diff_eq!(z, diff.signum(), epsilon = 1e-6);
            checked += 1;
        }
        assert!(checked > 200);
    }
}

mod backtest_properties {
    use super::*;

    #[test]
    fn run_is_idempotent() {
        let s = series(wavy_points(250));
        let pos = positions(&s, &alternating(250, 7));
        let a = backtest::run(&pos, &s, 10.0).unwrap();
        let b = backtest::run(&pos, &s, 10.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn higher_cost_never_raises_return() {
        let s = series(wavy_points(250));
        let pos = positions(&s, &alternating(250, 9));
        let results = backtest::cost_sensitivity(&pos, &s, &[0.0, 5.0, 10.0, 20.0, 50.0]).unwrap();

        assert_eq!(results.len(), 5);
        assert!(results[0].turnover > 0.0);
        for pair in results.windows(2) {
            assert!(pair[1].cumulative_return <= pair[0].cumulative_return);
        }
        assert!(results[4].cumulative_return < results[0].cumulative_return);
    }

    #[test]
    fn constant_prices_give_zero_return_and_drawdown() {
        let s = series(constant_points(60, 20.0));
        for signals in [
            vec![Signal::Flat; 60],
            vec![Signal::Long; 60],
            alternating(60, 5),
        ] {
            let result = backtest::run(&positions(&s, &signals), &s, 0.0).unwrap();
            assert_eq!(result.cumulative_return, 0.0);
            assert_eq!(result.max_drawdown, 0.0);
            assert_eq!(result.benchmark_return, 0.0);
        }
    }

    #[test]
    fn buy_and_hold_matches_benchmark() {
        let s = series(rising_points(100, 0.001));
        let result = backtest::run(&positions(&s, &[Signal::Long; 100]), &s, 0.0).unwrap();
        assert_abs_diff_eq!(result.final_nav(), result.final_benchmark_nav(), epsilon = 1e-12);
        assert_abs_diff_eq!(result.cumulative_return, 1.001f64.powi(99) - 1.0, epsilon = 1e-9);
        assert_eq!(result.max_drawdown, 0.0);
    }
}

mod insufficient_history {
    use super::*;

    #[test]
    fn short_series_fails_explicitly() {
        let s = series(rising_points(300, 0.001));
        let err = indicator::compute(&s, 18, 600, IndicatorMode::default()).unwrap_err();
        assert_eq!(
            err,
            RsrsError::InsufficientHistory {
                available: 300,
                required: 618,
            }
        );
    }

    #[test]
    fn full_chain_reports_same_failure() {
        let s = series(rising_points(300, 0.001));
        let point = GridPoint {
            n: 18,
            m: 600,
            s1: 0.7,
            s2: -0.7,
            cost_bps: 0.0,
        };
        let gate = rsrs::domain::filter::EntryGate::always_open();
        let err = sweep::evaluate(&s, &point, &SweepSettings::default(), &gate).unwrap_err();
        assert!(matches!(err, RsrsError::InsufficientHistory { available: 300, .. }));
    }
}

mod sweep_runner {
    use super::*;

    fn point(n: usize, m: usize) -> GridPoint {
        GridPoint {
            n,
            m,
            s1: 0.7,
            s2: -0.7,
            cost_bps: 0.0,
        }
    }

    #[test]
    fn valid_and_failing_points_both_recorded() {
        let s = series(wavy_points(300));
        let points = [point(18, 100), point(18, 600)];
        let report = sweep::sweep(&s, &points, &SweepSettings::default());

        assert_eq!(report.len(), 2);
        assert_eq!(report.successes().count(), 1);
        assert_eq!(report.failures().count(), 1);

        let map = report.into_map();
        assert!(map[&points[0]].is_ok());
        assert!(matches!(
            map[&points[1]],
            Err(RsrsError::InsufficientHistory {
                available: 300,
                required: 618,
            })
        ));
    }

    #[test]
    fn parallel_and_sequential_reports_identical() {
        let s = series(wavy_points(320));
        let grid = ParameterGrid {
            windows: vec![14, 18],
            zscore_windows: vec![60, 100],
            buy_thresholds: vec![0.5, 0.7],
            sell_thresholds: vec![-0.7],
            costs_bps: vec![0.0, 10.0],
        };
        let points = grid.points();
        assert_eq!(points.len(), 16);

        let parallel = sweep::sweep(
            &s,
            &points,
            &SweepSettings {
                parallel: true,
                ..SweepSettings::default()
            },
        );
        let sequential = sweep::sweep(
            &s,
            &points,
            &SweepSettings {
                parallel: false,
                ..SweepSettings::default()
            },
        );
        assert_eq!(parallel, sequential);
        assert!(parallel.best_by(SweepMetric::CumulativeReturn).is_some());
    }
}

mod pipelines {
    use super::*;

    const INI: &str = "[indicator]\nwindow = 18\nzscore_window = 100\n";

    #[test]
    fn backtest_pipeline_skips_failing_market() {
        let prices = MockPricePort::new()
            .with_points("data/hs300.csv", wavy_points(300))
            .with_error(
                "data/sh50.csv",
                RsrsError::MalformedInput {
                    line: 7,
                    reason: "bad close".into(),
                },
            );
        let reports = RecordingReportPort::new();
        let sources = vec!["data/hs300.csv".to_string(), "data/sh50.csv".to_string()];

        let outcomes = cli::run_backtest_pipeline(&prices, &reports, &run_config(INI), &sources);

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].name, "hs300");
        assert!(outcomes[0].outcome.is_ok());
        assert_eq!(outcomes[1].name, "sh50");
        assert!(matches!(
            outcomes[1].outcome,
            Err(RsrsError::MalformedInput { line: 7, .. })
        ));
        assert_eq!(
            reports.artifacts(),
            vec!["hs300:indicators".to_string(), "hs300:backtest".to_string()]
        );
    }

    #[test]
    fn backtest_pipeline_respects_date_range() {
        let prices = MockPricePort::new().with_points("hs300.csv", wavy_points(400));
        let reports = RecordingReportPort::new();
        let run = run_config(&format!("{}[data]\nstart_date = 2010-02-01\n", INI));

        let outcomes =
            cli::run_backtest_pipeline(&prices, &reports, &run, &["hs300.csv".to_string()]);
        let result = outcomes[0].outcome.as_ref().unwrap();
        // 31 days cut, first sample at index N - 1 of the remainder.
        assert_eq!(result.equity_curve[0].date, day(31 + 17));
    }

    #[test]
    fn costs_pipeline_returns_one_result_per_level() {
        let prices = MockPricePort::new().with_points("hs300.csv", wavy_points(300));
        let reports = RecordingReportPort::new();
        let results = cli::run_costs_pipeline(
            &prices,
            &reports,
            &run_config(INI),
            &[0.0, 10.0, 20.0],
            "hs300.csv",
        )
        .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[2].cost_bps, 20.0);
        assert_eq!(reports.artifacts(), vec!["hs300:costs".to_string()]);
    }

    #[test]
    fn comparison_pipeline_covers_all_variants() {
        let config = FileConfigAdapter::from_string(INI).unwrap();
        let prices = MockPricePort::new().with_points("hs300.csv", wavy_points(300));
        let reports = RecordingReportPort::new();
        let variants = cli::build_variants(&config).unwrap();

        let rows = cli::run_comparison_pipeline(
            &prices,
            &reports,
            &run_config(INI),
            &variants,
            "hs300.csv",
        )
        .unwrap();

        assert_eq!(rows.len(), 7);
        assert!(rows.iter().all(|r| r.outcome.is_ok()));
        assert_eq!(reports.artifacts(), vec!["hs300:comparison".to_string()]);
    }

    #[test]
    fn analysis_pipeline_writes_indicators_and_analysis() {
        let prices = MockPricePort::new().with_points("hs300.csv", wavy_points(300));
        let reports = RecordingReportPort::new();
        let config = FileConfigAdapter::from_string(INI).unwrap();
        let settings = cli::build_analysis_settings(&config).unwrap();

        let analysis = cli::run_analysis_pipeline(
            &prices,
            &reports,
            &run_config(INI),
            settings,
            "hs300.csv",
        )
        .unwrap();

        assert!(analysis.distribution.is_some());
        assert!(!analysis.observations.is_empty());
        assert_eq!(
            reports.artifacts(),
            vec!["hs300:indicators".to_string(), "hs300:analysis".to_string()]
        );
    }

    #[test]
    fn sweep_pipeline_uses_configured_grid() {
        let ini = format!("{}[sweep]\nwindow = 14, 18\nzscore_window = 100, 600\n", INI);
        let config = FileConfigAdapter::from_string(&ini).unwrap();
        let run = cli::build_run_config(&config).unwrap();
        let grid = cli::build_grid(&config, &run).unwrap();
        let settings = cli::build_sweep_settings(&config, &run);
        let prices = MockPricePort::new().with_points("hs300.csv", wavy_points(300));
        let reports = RecordingReportPort::new();

        let report = cli::run_sweep_pipeline(
            &prices,
            &reports,
            &run,
            &grid,
            &settings,
            SweepMetric::SharpeRatio,
            "hs300.csv",
        )
        .unwrap();

        assert_eq!(report.len(), 4);
        assert_eq!(report.successes().count(), 2);
        assert_eq!(report.failures().count(), 2);
        assert_eq!(reports.artifacts(), vec!["hs300:sweep".to_string()]);
    }
}

mod csv_files {
    use super::*;
    use std::fmt::Write as _;
    use tempfile::TempDir;

    fn to_csv(points: &[PricePoint]) -> String {
        let mut out = String::from("date,open,high,low,close,volume\n");
        for p in points {
            writeln!(
                out,
                "{},{},{},{},{},{}",
                p.date, p.open, p.high, p.low, p.close, p.volume
            )
            .unwrap();
        }
        out
    }

    #[test]
    fn written_series_loads_back_identically() {
        let dir = TempDir::new().unwrap();
        let points = wavy_points(120);
        std::fs::write(dir.path().join("hs300.csv"), to_csv(&points)).unwrap();

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let loaded = adapter.fetch_series("hs300.csv", None, None).unwrap();
        assert_eq!(loaded, series(points));
    }

    #[test]
    fn one_bad_row_rejects_the_file() {
        let dir = TempDir::new().unwrap();
        let mut points = wavy_points(50);
        points[20].low = points[20].high + 1.0;
        std::fs::write(dir.path().join("bad.csv"), to_csv(&points)).unwrap();

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter.fetch_series("bad.csv", None, None).unwrap_err();
        assert!(matches!(err, RsrsError::MalformedInput { line: 22, .. }));
    }
}
