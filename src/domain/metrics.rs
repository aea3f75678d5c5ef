//! Performance metrics over a NAV curve and its daily returns.

use crate::domain::error::RsrsError;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Standard deviations at or below this are treated as zero.
const MIN_RETURN_STD: f64 = 1e-12;

/// nav_final / nav_0 - 1
pub fn cumulative_return(navs: &[f64]) -> f64 {
    match (navs.first(), navs.last()) {
        (Some(&first), Some(&last)) if first > 0.0 => last / first - 1.0,
        _ => 0.0,
    }
}

/// (nav_final / nav_0)^(252 / num_days) - 1, where num_days counts daily returns.
pub fn annualized_return(navs: &[f64]) -> f64 {
    let num_days = navs.len().saturating_sub(1);
    if num_days == 0 {
        return 0.0;
    }
    let growth = 1.0 + cumulative_return(navs);
    if growth <= 0.0 {
        return -1.0;
    }
    growth.powf(TRADING_DAYS_PER_YEAR / num_days as f64) - 1.0
}

/// Largest fractional decline from a running peak.
pub fn max_drawdown(navs: &[f64]) -> f64 {
    let Some(&first) = navs.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &nav in navs {
        if nav > peak {
            peak = nav;
        } else if peak > 0.0 {
            max_dd = max_dd.max(1.0 - nav / peak);
        }
    }
    max_dd
}

/// Population mean and standard deviation.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// mean / std * sqrt(252) of daily returns.
pub fn sharpe_ratio(daily_returns: &[f64]) -> Result<f64, RsrsError> {
    let (mean, std) = mean_std(daily_returns);
    if daily_returns.is_empty() || std <= MIN_RETURN_STD {
        return Err(RsrsError::UndefinedMetric {
            metric: "sharpe_ratio",
        });
    }
    Ok(mean / std * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Relative outperformance of a final NAV over a benchmark's: (nav - bench) / bench.
pub fn excess_over(nav: f64, benchmark_nav: f64) -> f64 {
    if benchmark_nav > 0.0 {
        (nav - benchmark_nav) / benchmark_nav
    } else {
        0.0
    }
}
