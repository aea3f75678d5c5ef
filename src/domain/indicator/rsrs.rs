//! RSRS slope and standardized score.
//!
//! beta[t]  = OLS slope of y on x over bars t-N+1..=t (orientation per `RegressionMode`)
//! z[t]     = (beta[t] - mean(beta[t-M+1..=t])) / std(beta[t-M+1..=t])   (population std)
//! Warmup: no sample before bar N-1; no standardized score before M slopes exist.

use crate::domain::error::RsrsError;
use crate::domain::indicator::{IndicatorMode, IndicatorSample};
use crate::domain::rolling::{RollingMoments, RollingRegression};
use crate::domain::series::SeriesStore;

/// Value emitted when the slope window has zero spread.
pub const ZERO_STD_SENTINEL: f64 = 0.0;

pub fn compute(
    series: &SeriesStore,
    n: usize,
    m: usize,
    mode: IndicatorMode,
) -> Result<Vec<IndicatorSample>, RsrsError> {
    if n < 2 {
        return Err(RsrsError::InvalidWindow {
            reason: format!("regression window must be at least 2, got {}", n),
        });
    }
    if m == 0 {
        return Err(RsrsError::InvalidWindow {
            reason: "standardization window must be at least 1".to_string(),
        });
    }
    let required = n + m;
    if series.len() < required {
        return Err(RsrsError::InsufficientHistory {
            available: series.len(),
            required,
        });
    }

    let mut regression = RollingRegression::new(n);
    let mut slopes = RollingMoments::new(m);
    let mut samples = Vec::with_capacity(series.len() + 1 - n);

    for point in series.points() {
        let (x, y) = mode.regression.xy(point.high, point.low);
        regression.push(x, y);
        let Some(fit) = regression.fit() else {
            continue;
        };

        slopes.push(fit.slope);
        let standardized = slopes.is_full().then(|| {
            let std = slopes.std();
            if std > 0.0 {
                (fit.slope - slopes.mean()) / std
            } else {
                ZERO_STD_SENTINEL
            }
        });

        samples.push(IndicatorSample {
            date: point.date,
            slope: fit.slope,
            r_squared: fit.r_squared,
            raw_score: fit.slope,
            standardized_score: standardized,
            adjusted_score: mode.score.adjust(fit.slope, fit.r_squared, standardized),
        });
    }

    Ok(samples)
}
