//! Entry filters that can veto a FLAT -> LONG transition.
//!
//! - Price trend: SMA(period) today must exceed SMA(period) `lookback` bars ago.
//! - Volume correlation: Pearson correlation of volume and high over the
//!   trailing `window` bars must be positive.
//!
//! Exits are never filtered.

use crate::domain::error::RsrsError;
use crate::domain::rolling::{rolling_mean, RollingRegression};
use crate::domain::series::SeriesStore;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryFilter {
    #[default]
    None,
    PriceTrend { period: usize, lookback: usize },
    VolumeCorrelation { window: usize },
}

impl EntryFilter {
    pub fn validate(self) -> Result<(), RsrsError> {
        match self {
            EntryFilter::None => Ok(()),
            EntryFilter::PriceTrend { period, lookback } if period == 0 || lookback == 0 => {
                Err(RsrsError::InvalidWindow {
                    reason: "price trend period and lookback must be positive".to_string(),
                })
            }
            EntryFilter::VolumeCorrelation { window } if window < 2 => {
                Err(RsrsError::InvalidWindow {
                    reason: format!("volume correlation window must be at least 2, got {}", window),
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for EntryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryFilter::None => write!(f, "none"),
            EntryFilter::PriceTrend { period, lookback } => {
                write!(f, "price_trend({},{})", period, lookback)
            }
            EntryFilter::VolumeCorrelation { window } => {
                write!(f, "volume_correlation({})", window)
            }
        }
    }
}

/// Per-date permission to open a long position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntryGate {
    open: Option<HashMap<NaiveDate, bool>>,
}

impl EntryGate {
    /// Gate that never blocks.
    pub fn always_open() -> Self {
        Self { open: None }
    }

    pub fn from_flags(flags: HashMap<NaiveDate, bool>) -> Self {
        Self { open: Some(flags) }
    }

    /// Dates outside the computed range (filter warmup) are closed.
    pub fn is_open(&self, date: NaiveDate) -> bool {
        match &self.open {
            None => true,
            Some(flags) => flags.get(&date).copied().unwrap_or(false),
        }
    }

    pub fn build(series: &SeriesStore, filter: EntryFilter) -> Result<Self, RsrsError> {
        filter.validate()?;
        match filter {
            EntryFilter::None => Ok(Self::always_open()),
            EntryFilter::PriceTrend { period, lookback } => {
                Ok(Self::from_flags(price_trend_flags(series, period, lookback)))
            }
            EntryFilter::VolumeCorrelation { window } => {
                Ok(Self::from_flags(volume_correlation_flags(series, window)))
            }
        }
    }
}

fn price_trend_flags(
    series: &SeriesStore,
    period: usize,
    lookback: usize,
) -> HashMap<NaiveDate, bool> {
    let closes: Vec<f64> = series.points().iter().map(|p| p.close).collect();
    let sma = rolling_mean(&closes, period);
    series
        .points()
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let rising = i
                .checked_sub(lookback)
                .and_then(|j| Some(sma[i]? > sma[j]?))
                .unwrap_or(false);
            (point.date, rising)
        })
        .collect()
}

fn volume_correlation_flags(series: &SeriesStore, window: usize) -> HashMap<NaiveDate, bool> {
    let mut regression = RollingRegression::new(window);
    series
        .points()
        .iter()
        .map(|point| {
            regression.push(point.volume, point.high);
            let positive = regression.correlation().is_some_and(|c| c > 0.0);
            (point.date, positive)
        })
        .collect()
}
