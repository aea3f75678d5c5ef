//! Configuration validation.
//!
//! Every key is optional and falls back to the research defaults; a key that
//! is present must parse and lie in range. Errors name the section and key.

use crate::domain::error::RsrsError;
use crate::domain::filter::EntryFilter;
use crate::domain::indicator::{IndicatorMode, RegressionMode, ScoreMode};
use crate::domain::sweep::SweepMetric;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), RsrsError> {
    validate_data(config)?;
    validate_indicator(config)?;
    validate_signal(config)?;
    validate_backtest(config)?;
    validate_sweep(config)?;
    validate_analysis(config)?;
    Ok(())
}

/// Parsed value of `[section] key`, or `default` when absent.
pub fn read_value<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, RsrsError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => parse_item(&raw, section, key),
    }
}

/// Finite float value of `[section] key`, or `default` when absent.
pub fn read_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, RsrsError> {
    let value = read_value(config, section, key, default)?;
    if !value.is_finite() {
        return Err(RsrsError::config_invalid(section, key, "must be a finite number"));
    }
    Ok(value)
}

pub fn read_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, RsrsError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                RsrsError::config_invalid(
                    section,
                    key,
                    format!("invalid {} format, expected YYYY-MM-DD", key),
                )
            }),
    }
}

/// Comma list of `[section] key`; `None` when absent, error when present but empty.
pub fn read_list<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<Vec<T>>, RsrsError> {
    let Some(items) = config.get_list(section, key) else {
        return Ok(None);
    };
    if items.is_empty() {
        return Err(RsrsError::config_invalid(section, key, "list must not be empty"));
    }
    items
        .iter()
        .map(|item| parse_item(item, section, key))
        .collect::<Result<Vec<T>, _>>()
        .map(Some)
}

fn parse_item<T: FromStr>(raw: &str, section: &str, key: &str) -> Result<T, RsrsError> {
    raw.trim()
        .parse()
        .map_err(|_| RsrsError::config_invalid(section, key, format!("cannot parse '{}'", raw.trim())))
}

fn validate_data(config: &dyn ConfigPort) -> Result<(), RsrsError> {
    let start = read_date(config, "data", "start_date")?;
    let end = read_date(config, "data", "end_date")?;
    if start.zip(end).is_some_and(|(start, end)| start >= end) {
        return Err(RsrsError::config_invalid(
            "data",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

fn validate_indicator(config: &dyn ConfigPort) -> Result<(), RsrsError> {
    read_windows(config)?;
    read_indicator_mode(config)?;
    Ok(())
}

/// `(window, zscore_window)`, defaulting to (18, 600).
pub fn read_windows(config: &dyn ConfigPort) -> Result<(usize, usize), RsrsError> {
    let n = read_value(config, "indicator", "window", 18usize)?;
    if n < 2 {
        return Err(RsrsError::config_invalid(
            "indicator",
            "window",
            "window must be at least 2",
        ));
    }
    let m = read_value(config, "indicator", "zscore_window", 600usize)?;
    if m < 1 {
        return Err(RsrsError::config_invalid(
            "indicator",
            "zscore_window",
            "zscore_window must be at least 1",
        ));
    }
    Ok((n, m))
}

/// Exponent applied to R² by the power score; must be non-negative.
pub fn read_score_power(config: &dyn ConfigPort) -> Result<f64, RsrsError> {
    let power = read_f64(config, "indicator", "score_power", 2.0)?;
    if power < 0.0 {
        return Err(RsrsError::config_invalid(
            "indicator",
            "score_power",
            "must be non-negative",
        ));
    }
    Ok(power)
}

pub fn read_indicator_mode(config: &dyn ConfigPort) -> Result<IndicatorMode, RsrsError> {
    let regression = match config.get_string("indicator", "regression") {
        Some(name) => name
            .parse::<RegressionMode>()
            .map_err(|reason| RsrsError::config_invalid("indicator", "regression", reason))?,
        None => RegressionMode::default(),
    };
    let power = read_score_power(config)?;
    let score = match config.get_string("indicator", "score") {
        Some(name) => ScoreMode::parse(&name, power)
            .map_err(|reason| RsrsError::config_invalid("indicator", "score", reason))?,
        None => ScoreMode::default(),
    };
    Ok(IndicatorMode { regression, score })
}

fn validate_signal(config: &dyn ConfigPort) -> Result<(), RsrsError> {
    let mode = read_indicator_mode(config)?;
    read_thresholds(config, mode.score)?;
    read_value(config, "signal", "lag_days", 1usize)?;
    read_entry_filter(config)?;
    Ok(())
}

/// `(buy, sell)`; missing keys take the score's research defaults.
pub fn read_thresholds(config: &dyn ConfigPort, score: ScoreMode) -> Result<(f64, f64), RsrsError> {
    let (default_buy, default_sell) = score.default_thresholds();
    let buy = read_f64(config, "signal", "buy_threshold", default_buy)?;
    let sell = read_f64(config, "signal", "sell_threshold", default_sell)?;
    if buy <= sell {
        return Err(RsrsError::config_invalid(
            "signal",
            "buy_threshold",
            "buy_threshold must be greater than sell_threshold",
        ));
    }
    Ok((buy, sell))
}

/// Entry filter named by `[signal] filter` with its window parameters.
///
/// The window keys are range-checked even when the filter does not use them.
pub fn read_entry_filter(config: &dyn ConfigPort) -> Result<EntryFilter, RsrsError> {
    let period = read_value(config, "signal", "trend_period", 20usize)?;
    if period < 1 {
        return Err(RsrsError::config_invalid(
            "signal",
            "trend_period",
            "trend_period must be at least 1",
        ));
    }
    let lookback = read_value(config, "signal", "trend_lookback", 3usize)?;
    if lookback < 1 {
        return Err(RsrsError::config_invalid(
            "signal",
            "trend_lookback",
            "trend_lookback must be at least 1",
        ));
    }
    let window = read_value(config, "signal", "volume_window", 10usize)?;
    if window < 2 {
        return Err(RsrsError::config_invalid(
            "signal",
            "volume_window",
            "volume_window must be at least 2",
        ));
    }

    match config
        .get_string("signal", "filter")
        .map(|s| s.trim().to_lowercase())
        .as_deref()
    {
        None | Some("none") => Ok(EntryFilter::None),
        Some("price_trend") => Ok(EntryFilter::PriceTrend { period, lookback }),
        Some("volume_correlation") => Ok(EntryFilter::VolumeCorrelation { window }),
        Some(other) => Err(RsrsError::config_invalid(
            "signal",
            "filter",
            format!(
                "unknown filter '{}' (expected none, price_trend or volume_correlation)",
                other
            ),
        )),
    }
}

fn validate_backtest(config: &dyn ConfigPort) -> Result<(), RsrsError> {
    if read_f64(config, "backtest", "cost_bps", 0.0)? < 0.0 {
        return Err(RsrsError::config_invalid(
            "backtest",
            "cost_bps",
            "cost_bps must be non-negative",
        ));
    }
    let levels = read_list::<f64>(config, "backtest", "cost_levels")?.unwrap_or_default();
    if levels.iter().any(|c| !c.is_finite() || *c < 0.0) {
        return Err(RsrsError::config_invalid(
            "backtest",
            "cost_levels",
            "cost levels must be non-negative",
        ));
    }
    Ok(())
}

/// Sweep axes only need to parse; out-of-range points fail individually.
fn validate_sweep(config: &dyn ConfigPort) -> Result<(), RsrsError> {
    read_list::<usize>(config, "sweep", "window")?;
    read_list::<usize>(config, "sweep", "zscore_window")?;
    read_list::<f64>(config, "sweep", "buy_threshold")?;
    read_list::<f64>(config, "sweep", "sell_threshold")?;
    read_list::<f64>(config, "sweep", "cost_bps")?;
    if let Some(metric) = config.get_string("sweep", "rank_by") {
        metric
            .parse::<SweepMetric>()
            .map_err(|reason| RsrsError::config_invalid("sweep", "rank_by", reason))?;
    }
    Ok(())
}

fn validate_analysis(config: &dyn ConfigPort) -> Result<(), RsrsError> {
    if read_value(config, "analysis", "forward_days", 10usize)? < 1 {
        return Err(RsrsError::config_invalid(
            "analysis",
            "forward_days",
            "forward_days must be at least 1",
        ));
    }
    if read_f64(config, "analysis", "bin_width", 0.1)? <= 0.0 {
        return Err(RsrsError::config_invalid(
            "analysis",
            "bin_width",
            "bin_width must be positive",
        ));
    }
    if read_value(config, "analysis", "slope_mean_window", 250usize)? < 1 {
        return Err(RsrsError::config_invalid(
            "analysis",
            "slope_mean_window",
            "slope_mean_window must be at least 1",
        ));
    }
    read_date(config, "analysis", "start_date")?;
    Ok(())
}
