//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestResult};
use crate::domain::comparison::{self, ComparisonRow, ComparisonSettings};
use crate::domain::config_validation::{
    read_date, read_entry_filter, read_f64, read_indicator_mode, read_list, read_score_power,
    read_thresholds, read_value, read_windows, validate_config,
};
use crate::domain::error::RsrsError;
use crate::domain::filter::{EntryFilter, EntryGate};
use crate::domain::indicator::{self, IndicatorMode, IndicatorSample};
use crate::domain::score_analysis::{self, AnalysisSettings, ScoreAnalysis};
use crate::domain::series::SeriesStore;
use crate::domain::signal::{self, Position};
use crate::domain::sweep::{self, ParameterGrid, SweepMetric, SweepReport, SweepSettings};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PricePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "rsrs", about = "RSRS indicator research backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest one or more markets
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Price file; repeat for a multi-market run
        #[arg(short, long)]
        data: Vec<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the parameter sweep
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Backtest at every configured cost level
    Costs {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Score distribution and predictive power
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare score variants side by side
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the date range of price file(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Vec<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            data,
            output,
        } => run_backtest(&config, &data, output.as_ref()),
        Command::Sweep {
            config,
            data,
            output,
        } => run_sweep(&config, data.as_ref(), output.as_ref()),
        Command::Costs {
            config,
            data,
            output,
        } => run_costs(&config, data.as_ref(), output.as_ref()),
        Command::Analyze {
            config,
            data,
            output,
        } => run_analyze(&config, data.as_ref(), output.as_ref()),
        Command::Compare {
            config,
            data,
            output,
        } => run_compare(&config, data.as_ref(), output.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, data } => run_info(&config, &data),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Loads and validates the INI file at `path`.
pub fn load_config(path: &Path) -> Result<FileConfigAdapter, RsrsError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub n: usize,
    pub m: usize,
    pub mode: IndicatorMode,
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    pub lag_days: usize,
    pub filter: EntryFilter,
    pub cost_bps: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub slope_mean_window: usize,
}

pub fn build_run_config(config: &dyn ConfigPort) -> Result<RunConfig, RsrsError> {
    let (n, m) = read_windows(config)?;
    let mode = read_indicator_mode(config)?;
    let (buy_threshold, sell_threshold) = read_thresholds(config, mode.score)?;
    Ok(RunConfig {
        n,
        m,
        mode,
        buy_threshold,
        sell_threshold,
        lag_days: read_value(config, "signal", "lag_days", 1usize)?,
        filter: read_entry_filter(config)?,
        cost_bps: read_f64(config, "backtest", "cost_bps", 0.0)?,
        start_date: read_date(config, "data", "start_date")?,
        end_date: read_date(config, "data", "end_date")?,
        slope_mean_window: read_value(config, "analysis", "slope_mean_window", 250usize)?,
    })
}

/// Sweep axes; an axis missing from `[sweep]` holds the single configured value.
pub fn build_grid(config: &dyn ConfigPort, run: &RunConfig) -> Result<ParameterGrid, RsrsError> {
    Ok(ParameterGrid {
        windows: read_list(config, "sweep", "window")?.unwrap_or_else(|| vec![run.n]),
        zscore_windows: read_list(config, "sweep", "zscore_window")?
            .unwrap_or_else(|| vec![run.m]),
        buy_thresholds: read_list(config, "sweep", "buy_threshold")?
            .unwrap_or_else(|| vec![run.buy_threshold]),
        sell_thresholds: read_list(config, "sweep", "sell_threshold")?
            .unwrap_or_else(|| vec![run.sell_threshold]),
        costs_bps: read_list(config, "sweep", "cost_bps")?.unwrap_or_else(|| vec![run.cost_bps]),
    })
}

pub fn build_sweep_settings(config: &dyn ConfigPort, run: &RunConfig) -> SweepSettings {
    SweepSettings {
        mode: run.mode,
        lag_days: run.lag_days,
        filter: run.filter,
        parallel: config.get_bool("sweep", "parallel", true),
    }
}

pub fn build_rank_metric(config: &dyn ConfigPort) -> Result<SweepMetric, RsrsError> {
    match config.get_string("sweep", "rank_by") {
        Some(name) => name
            .parse()
            .map_err(|reason| RsrsError::config_invalid("sweep", "rank_by", reason)),
        None => Ok(SweepMetric::SharpeRatio),
    }
}

pub fn build_cost_levels(config: &dyn ConfigPort) -> Result<Vec<f64>, RsrsError> {
    Ok(read_list(config, "backtest", "cost_levels")?.unwrap_or_else(|| vec![0.0, 10.0, 20.0]))
}

pub fn build_analysis_settings(config: &dyn ConfigPort) -> Result<AnalysisSettings, RsrsError> {
    Ok(AnalysisSettings {
        forward_days: read_value(config, "analysis", "forward_days", 10usize)?,
        bin_width: read_f64(config, "analysis", "bin_width", 0.1)?,
        start_date: read_date(config, "analysis", "start_date")?,
    })
}

pub fn build_comparison_settings(run: &RunConfig) -> ComparisonSettings {
    ComparisonSettings {
        n: run.n,
        m: run.m,
        lag_days: run.lag_days,
        cost_bps: run.cost_bps,
        regression: run.mode.regression,
    }
}

/// The seven research variants with filter windows from `[signal]`.
pub fn build_variants(
    config: &dyn ConfigPort,
) -> Result<Vec<comparison::StrategyVariant>, RsrsError> {
    let price_trend = EntryFilter::PriceTrend {
        period: read_value(config, "signal", "trend_period", 20usize)?,
        lookback: read_value(config, "signal", "trend_lookback", 3usize)?,
    };
    let volume_correlation = EntryFilter::VolumeCorrelation {
        window: read_value(config, "signal", "volume_window", 10usize)?,
    };
    Ok(comparison::research_variants(
        read_score_power(config)?,
        price_trend,
        volume_correlation,
    ))
}

/// Price files from `--data`, else the comma list in `[data] path`.
pub fn resolve_sources(
    overrides: &[PathBuf],
    config: &dyn ConfigPort,
) -> Result<Vec<String>, RsrsError> {
    if !overrides.is_empty() {
        return Ok(overrides
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect());
    }
    match config.get_list("data", "path") {
        Some(paths) if !paths.is_empty() => Ok(paths),
        _ => Err(RsrsError::config_missing("data", "path")),
    }
}

pub fn resolve_output(output: Option<&PathBuf>, config: &dyn ConfigPort) -> PathBuf {
    output
        .cloned()
        .or_else(|| config.get_string("output", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("output"))
}

/// Artifact prefix for a price source: its file stem.
pub fn market_name(source: &str) -> String {
    Path::new(source)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string())
}

fn load_series(
    prices: &dyn PricePort,
    source: &str,
    run: &RunConfig,
) -> Result<SeriesStore, RsrsError> {
    let series = prices.fetch_series(source, run.start_date, run.end_date)?;
    info!(source, days = series.len(), "loaded price series");
    Ok(series)
}

/// Indicator samples and lagged positions for the configured strategy.
pub fn positions_for(
    series: &SeriesStore,
    run: &RunConfig,
) -> Result<(Vec<IndicatorSample>, Vec<Position>), RsrsError> {
    let samples = indicator::compute(series, run.n, run.m, run.mode)?;
    let gate = EntryGate::build(series, run.filter)?;
    let positions = signal::generate_gated(
        &samples,
        run.buy_threshold,
        run.sell_threshold,
        run.lag_days,
        &gate,
    )?;
    Ok((samples, positions))
}

fn format_sharpe(sharpe: Option<f64>) -> String {
    sharpe.map_or_else(|| "n/a".to_string(), |s| format!("{:.2}", s))
}

fn print_backtest_summary(name: &str, result: &BacktestResult) {
    eprintln!("\n=== Backtest Results: {} ===", name);
    if let (Some(first), Some(last)) = (result.equity_curve.first(), result.equity_curve.last()) {
        eprintln!(
            "Period:           {} to {} ({} days)",
            first.date,
            last.date,
            result.total_days()
        );
    }
    eprintln!("Total Return:     {:.2}%", result.cumulative_return * 100.0);
    eprintln!("Annualized:       {:.2}%", result.annualized_return * 100.0);
    eprintln!("Benchmark Return: {:.2}%", result.benchmark_return * 100.0);
    eprintln!("Excess Return:    {:.2}%", result.excess_return() * 100.0);
    eprintln!("Sharpe Ratio:     {}", format_sharpe(result.sharpe_ratio));
    eprintln!("Max Drawdown:     -{:.1}%", result.max_drawdown * 100.0);
    eprintln!("Position Changes: {}", result.position_changes);
    eprintln!("Total Trades:     {}", result.trades.len());
    eprintln!("Win Rate:         {:.1}%", result.win_rate * 100.0);
}

/// Outcome of one market in a backtest run.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketOutcome {
    pub name: String,
    pub outcome: Result<BacktestResult, RsrsError>,
}

fn backtest_market(
    prices: &dyn PricePort,
    reports: &dyn ReportPort,
    run: &RunConfig,
    source: &str,
) -> Result<BacktestResult, RsrsError> {
    let name = market_name(source);
    let series = load_series(prices, source, run)?;
    let (samples, positions) = positions_for(&series, run)?;
    let result = backtest_engine::run(&positions, &series, run.cost_bps)?;

    let slope_mean = score_analysis::slope_rolling_mean(&samples, run.slope_mean_window);
    reports.write_indicators(&name, &samples, &slope_mean)?;
    reports.write_backtest(&name, &result)?;
    Ok(result)
}

/// Backtests every source in order; a failing market does not stop the others.
pub fn run_backtest_pipeline(
    prices: &dyn PricePort,
    reports: &dyn ReportPort,
    run: &RunConfig,
    sources: &[String],
) -> Vec<MarketOutcome> {
    eprintln!(
        "Running backtest: {} market(s), N={} M={} score={} S1={} S2={} lag={} cost={}bps",
        sources.len(),
        run.n,
        run.m,
        run.mode.score,
        run.buy_threshold,
        run.sell_threshold,
        run.lag_days,
        run.cost_bps
    );

    let outcomes: Vec<MarketOutcome> = sources
        .iter()
        .map(|source| {
            let name = market_name(source);
            let outcome = backtest_market(prices, reports, run, source);
            match &outcome {
                Ok(result) => print_backtest_summary(&name, result),
                Err(e) => {
                    warn!(market = %name, error = %e, "market failed");
                    eprintln!("warning: skipping {} ({})", name, e);
                }
            }
            MarketOutcome { name, outcome }
        })
        .collect();

    if outcomes.len() > 1 {
        eprintln!("\n=== Per-Market Summary ===");
        for market in &outcomes {
            match &market.outcome {
                Ok(r) => eprintln!(
                    "  {}:  {:+.2}% total, {:+.2}% vs buy-and-hold, sharpe {}, {} trades",
                    market.name,
                    r.cumulative_return * 100.0,
                    r.excess_return() * 100.0,
                    format_sharpe(r.sharpe_ratio),
                    r.trades.len()
                ),
                Err(e) => eprintln!("  {}:  failed ({})", market.name, e),
            }
        }
    }
    outcomes
}

fn run_backtest(
    config_path: &Path,
    data: &[PathBuf],
    output: Option<&PathBuf>,
) -> Result<(), RsrsError> {
    // Stage 1: Load and validate config
    let config = load_config(config_path)?;
    let run = build_run_config(&config)?;

    // Stage 2: Resolve inputs and outputs
    let sources = resolve_sources(data, &config)?;
    let reports = CsvReportAdapter::new(resolve_output(output, &config))?;
    let prices = CsvAdapter::new(PathBuf::new());

    // Stage 3: Run every market
    let outcomes = run_backtest_pipeline(&prices, &reports, &run, &sources);

    let succeeded = outcomes.iter().filter(|m| m.outcome.is_ok()).count();
    info!(succeeded, failed = outcomes.len() - succeeded, "backtest finished");
    if succeeded == 0 {
        // Every market failed; report the first failure.
        if let Some(Err(e)) = outcomes.into_iter().next().map(|m| m.outcome) {
            return Err(e);
        }
        return Ok(());
    }
    eprintln!("\nReports written to: {}", reports.dir().display());
    Ok(())
}

pub fn run_sweep_pipeline(
    prices: &dyn PricePort,
    reports: &dyn ReportPort,
    run: &RunConfig,
    grid: &ParameterGrid,
    settings: &SweepSettings,
    metric: SweepMetric,
    source: &str,
) -> Result<SweepReport, RsrsError> {
    let name = market_name(source);
    let series = load_series(prices, source, run)?;
    eprintln!(
        "Sweeping {} grid points on {} ({} days)",
        grid.len(),
        name,
        series.len()
    );

    let report = sweep::sweep(&series, &grid.points(), settings);
    reports.write_sweep(&name, &report)?;

    eprintln!("\n=== Sweep Results: {} ===", name);
    eprintln!("Grid Points:      {}", report.len());
    eprintln!("Succeeded:        {}", report.successes().count());
    eprintln!("Failed:           {}", report.failures().count());
    match report.best_by(metric) {
        Some((point, result)) => {
            eprintln!("Best by {}:", metric);
            eprintln!("  {}", point);
            eprintln!(
                "  total {:.2}%, annualized {:.2}%, sharpe {}, max drawdown -{:.1}%",
                result.cumulative_return * 100.0,
                result.annualized_return * 100.0,
                format_sharpe(result.sharpe_ratio),
                result.max_drawdown * 100.0
            );
        }
        None => eprintln!("No grid point has a defined {}", metric),
    }
    Ok(report)
}

fn run_sweep(
    config_path: &Path,
    data: Option<&PathBuf>,
    output: Option<&PathBuf>,
) -> Result<(), RsrsError> {
    let config = load_config(config_path)?;
    let run = build_run_config(&config)?;
    let grid = build_grid(&config, &run)?;
    let settings = build_sweep_settings(&config, &run);
    let metric = build_rank_metric(&config)?;

    let source = first_source(data, &config)?;
    let reports = CsvReportAdapter::new(resolve_output(output, &config))?;
    let prices = CsvAdapter::new(PathBuf::new());

    run_sweep_pipeline(&prices, &reports, &run, &grid, &settings, metric, &source)?;
    eprintln!("\nSweep surface written to: {}", reports.dir().display());
    Ok(())
}

pub fn run_costs_pipeline(
    prices: &dyn PricePort,
    reports: &dyn ReportPort,
    run: &RunConfig,
    levels: &[f64],
    source: &str,
) -> Result<Vec<BacktestResult>, RsrsError> {
    let name = market_name(source);
    let series = load_series(prices, source, run)?;
    let (_, positions) = positions_for(&series, run)?;
    let results = backtest_engine::cost_sensitivity(&positions, &series, levels)?;
    reports.write_costs(&name, &results)?;

    eprintln!("\n=== Cost Sensitivity: {} ===", name);
    eprintln!("  Cost (bps)   Total Return   Annualized   Sharpe   Final NAV");
    for r in &results {
        eprintln!(
            "  {:>10.1}   {:>11.2}%   {:>9.2}%   {:>6}   {:>9.4}",
            r.cost_bps,
            r.cumulative_return * 100.0,
            r.annualized_return * 100.0,
            format_sharpe(r.sharpe_ratio),
            r.final_nav()
        );
    }
    Ok(results)
}

fn run_costs(
    config_path: &Path,
    data: Option<&PathBuf>,
    output: Option<&PathBuf>,
) -> Result<(), RsrsError> {
    let config = load_config(config_path)?;
    let run = build_run_config(&config)?;
    let levels = build_cost_levels(&config)?;

    let source = first_source(data, &config)?;
    let reports = CsvReportAdapter::new(resolve_output(output, &config))?;
    let prices = CsvAdapter::new(PathBuf::new());

    run_costs_pipeline(&prices, &reports, &run, &levels, &source)?;
    Ok(())
}

fn format_corr(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.3}", v))
}

pub fn run_analysis_pipeline(
    prices: &dyn PricePort,
    reports: &dyn ReportPort,
    run: &RunConfig,
    settings: AnalysisSettings,
    source: &str,
) -> Result<ScoreAnalysis, RsrsError> {
    let name = market_name(source);
    let series = load_series(prices, source, run)?;
    let samples = indicator::compute(&series, run.n, run.m, run.mode)?;
    let analysis = score_analysis::analyze(&samples, &series, settings)?;

    let slope_mean = score_analysis::slope_rolling_mean(&samples, run.slope_mean_window);
    reports.write_indicators(&name, &samples, &slope_mean)?;
    reports.write_analysis(&name, &analysis)?;

    eprintln!("\n=== Score Analysis: {} ({}) ===", name, run.mode.score);
    match &analysis.distribution {
        Some(d) => {
            eprintln!("Samples:          {}", d.count);
            eprintln!("Mean:             {:.4}", d.mean);
            eprintln!("Std Dev:          {:.4}", d.std);
            eprintln!("Skewness:         {}", format_corr(d.skewness));
            eprintln!("Excess Kurtosis:  {}", format_corr(d.excess_kurtosis));
        }
        None => eprintln!("No scores after the analysis start date"),
    }
    eprintln!(
        "Forward {}-day observations: {} in {} bins",
        settings.forward_days,
        analysis.observations.len(),
        analysis.bins.len()
    );
    eprintln!("Correlation with expected return (right / left / total):");
    eprintln!(
        "  {} / {} / {}",
        format_corr(analysis.expected_return.right),
        format_corr(analysis.expected_return.left),
        format_corr(analysis.expected_return.total)
    );
    eprintln!("Correlation with up probability (right / left / total):");
    eprintln!(
        "  {} / {} / {}",
        format_corr(analysis.up_probability.right),
        format_corr(analysis.up_probability.left),
        format_corr(analysis.up_probability.total)
    );
    Ok(analysis)
}

fn run_analyze(
    config_path: &Path,
    data: Option<&PathBuf>,
    output: Option<&PathBuf>,
) -> Result<(), RsrsError> {
    let config = load_config(config_path)?;
    let run = build_run_config(&config)?;
    let settings = build_analysis_settings(&config)?;

    let source = first_source(data, &config)?;
    let reports = CsvReportAdapter::new(resolve_output(output, &config))?;
    let prices = CsvAdapter::new(PathBuf::new());

    run_analysis_pipeline(&prices, &reports, &run, settings, &source)?;
    Ok(())
}

pub fn run_comparison_pipeline(
    prices: &dyn PricePort,
    reports: &dyn ReportPort,
    run: &RunConfig,
    variants: &[comparison::StrategyVariant],
    source: &str,
) -> Result<Vec<ComparisonRow>, RsrsError> {
    let name = market_name(source);
    let series = load_series(prices, source, run)?;
    let rows = comparison::compare(&series, variants, &build_comparison_settings(run));
    reports.write_comparison(&name, &rows)?;

    eprintln!("\n=== Strategy Comparison: {} ===", name);
    eprintln!(
        "  {:<34} {:>10} {:>10} {:>10} {:>7}",
        "Strategy", "Final NAV", "Buy&Hold", "Excess", "Trades"
    );
    for row in &rows {
        match &row.outcome {
            Ok(r) => eprintln!(
                "  {:<34} {:>10.4} {:>10.4} {:>9.2}% {:>7}",
                row.name,
                r.final_nav(),
                r.final_benchmark_nav(),
                r.excess_return() * 100.0,
                row.trade_count()
            ),
            Err(e) => {
                warn!(variant = %row.name, error = %e, "variant failed");
                eprintln!("  {:<34} failed ({})", row.name, e);
            }
        }
    }
    Ok(rows)
}

fn run_compare(
    config_path: &Path,
    data: Option<&PathBuf>,
    output: Option<&PathBuf>,
) -> Result<(), RsrsError> {
    let config = load_config(config_path)?;
    let run = build_run_config(&config)?;
    let variants = build_variants(&config)?;

    let source = first_source(data, &config)?;
    let reports = CsvReportAdapter::new(resolve_output(output, &config))?;
    let prices = CsvAdapter::new(PathBuf::new());

    run_comparison_pipeline(&prices, &reports, &run, &variants, &source)?;
    Ok(())
}

fn first_source(data: Option<&PathBuf>, config: &dyn ConfigPort) -> Result<String, RsrsError> {
    let overrides: Vec<PathBuf> = data.cloned().into_iter().collect();
    let sources = resolve_sources(&overrides, config)?;
    if sources.len() > 1 {
        warn!(count = sources.len(), "several price files configured; using the first");
    }
    sources
        .into_iter()
        .next()
        .ok_or_else(|| RsrsError::config_missing("data", "path"))
}

fn run_validate(config_path: &Path) -> Result<(), RsrsError> {
    let config = load_config(config_path)?;
    let run = build_run_config(&config)?;
    let grid = build_grid(&config, &run)?;

    eprintln!("\nIndicator:");
    eprintln!("  window: {}  zscore_window: {}", run.n, run.m);
    eprintln!("  regression: {}  score: {}", run.mode.regression, run.mode.score);
    eprintln!("\nSignal:");
    eprintln!(
        "  buy: {}  sell: {}  lag: {} day(s)  filter: {}",
        run.buy_threshold, run.sell_threshold, run.lag_days, run.filter
    );
    eprintln!("\nBacktest:");
    eprintln!("  cost: {} bps", run.cost_bps);
    eprintln!("  sweep grid: {} point(s)", grid.len());
    if let Some(paths) = config.get_list("data", "path") {
        eprintln!("\nData:");
        for path in &paths {
            eprintln!("  {}", path);
        }
    }

    eprintln!("\nConfiguration is valid.");
    Ok(())
}

fn run_info(config_path: &Path, data: &[PathBuf]) -> Result<(), RsrsError> {
    let config = load_config(config_path)?;
    let sources = resolve_sources(data, &config)?;
    let prices = CsvAdapter::new(PathBuf::new());

    for source in &sources {
        match prices.get_data_range(source)? {
            Some((first, last, count)) => {
                println!("{}: {} bars, {} to {}", market_name(source), count, first, last);
            }
            None => eprintln!("{}: no data found", market_name(source)),
        }
    }
    Ok(())
}
