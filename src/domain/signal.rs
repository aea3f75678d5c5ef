//! FLAT/LONG signal state machine and execution lag.
//!
//! Transition table (initial state FLAT):
//!
//! | state | condition                       | next |
//! |-------|---------------------------------|------|
//! | FLAT  | score > buy and entry gate open | LONG |
//! | LONG  | score < sell                    | FLAT |
//! | any   | otherwise / no score            | same |

use crate::domain::error::RsrsError;
use crate::domain::filter::EntryGate;
use crate::domain::indicator::IndicatorSample;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Signal {
    #[default]
    Flat,
    Long,
}

impl Signal {
    pub fn is_long(self) -> bool {
        self == Signal::Long
    }

    pub fn next(self, score: Option<f64>, thresholds: Thresholds, entry_open: bool) -> Signal {
        match (self, score) {
            (Signal::Flat, Some(s)) if s > thresholds.buy && entry_open => Signal::Long,
            (Signal::Long, Some(s)) if s < thresholds.sell => Signal::Flat,
            (state, _) => state,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Flat => write!(f, "FLAT"),
            Signal::Long => write!(f, "LONG"),
        }
    }
}

/// Asymmetric entry/exit band; `buy > sell` always holds for a constructed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    buy: f64,
    sell: f64,
}

impl Thresholds {
    pub fn new(buy: f64, sell: f64) -> Result<Self, RsrsError> {
        if !buy.is_finite() || !sell.is_finite() || buy <= sell {
            return Err(RsrsError::InvalidThresholds { s1: buy, s2: sell });
        }
        Ok(Self { buy, sell })
    }

}

/// Signal acted upon on `date`, decided `applied_lag_days` bars earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub date: NaiveDate,
    pub signal: Signal,
    pub applied_lag_days: usize,
}

/// Unlagged signal per sample.
pub fn signals(samples: &[IndicatorSample], thresholds: Thresholds, gate: &EntryGate) -> Vec<Signal> {
    let mut state = Signal::Flat;
    samples
        .iter()
        .map(|sample| {
            state = state.next(sample.adjusted_score, thresholds, gate.is_open(sample.date));
            state
        })
        .collect()
}

pub fn generate(
    samples: &[IndicatorSample],
    s1: f64,
    s2: f64,
    lag_days: usize,
) -> Result<Vec<Position>, RsrsError> {
    generate_gated(samples, s1, s2, lag_days, &EntryGate::always_open())
}

/// Like [`generate`], but entries also require `gate` to be open on the signal date.
pub fn generate_gated(
    samples: &[IndicatorSample],
    s1: f64,
    s2: f64,
    lag_days: usize,
    gate: &EntryGate,
) -> Result<Vec<Position>, RsrsError> {
    let thresholds = Thresholds::new(s1, s2)?;
    let raw = signals(samples, thresholds, gate);

    Ok(samples
        .iter()
        .enumerate()
        .map(|(i, sample)| Position {
            date: sample.date,
            signal: i
                .checked_sub(lag_days)
                .map(|j| raw[j])
                .unwrap_or(Signal::Flat),
            applied_lag_days: lag_days,
        })
        .collect())
}

/// Number of days on which the position differs from the previous day's.
/// The state before the first position is FLAT.
pub fn count_changes(positions: &[Position]) -> usize {
    positions
        .iter()
        .scan(Signal::Flat, |prev, p| {
            let changed = *prev != p.signal;
            *prev = p.signal;
            Some(changed)
        })
        .filter(|&changed| changed)
        .count()
}
