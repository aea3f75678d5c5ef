//! RSRS indicator types.
//!
//! - `IndicatorSample`: one day of regression output and derived scores
//! - `RegressionMode`: which price is regressed on which
//! - `ScoreMode`: which score drives the signal engine
//! - `IndicatorMode`: the pair of the two, as consumed by [`rsrs::compute`]

pub mod rsrs;

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub use rsrs::compute;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSample {
    pub date: NaiveDate,
    pub slope: f64,
    pub r_squared: f64,
    pub raw_score: f64,
    pub standardized_score: Option<f64>,
    pub adjusted_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegressionMode {
    /// high = alpha + beta * low
    #[default]
    HighOnLow,
    /// low = alpha + beta * high
    LowOnHigh,
}

impl RegressionMode {
    /// (x, y) pair fed to the regression for one bar.
    pub fn xy(self, high: f64, low: f64) -> (f64, f64) {
        match self {
            RegressionMode::HighOnLow => (low, high),
            RegressionMode::LowOnHigh => (high, low),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScoreMode {
    /// Raw slope.
    Slope,
    /// z-score of the slope.
    #[default]
    Standard,
    /// z-score weighted by R².
    Modified,
    /// z-score weighted by R² and the slope itself.
    RightSkewed,
    /// z-score weighted by R² raised to a configured power.
    RSquaredPower(f64),
}

impl ScoreMode {
    /// Adjusted score for one day, if the standardized score exists yet.
    pub fn adjust(self, slope: f64, r_squared: f64, standardized: Option<f64>) -> Option<f64> {
        match self {
            ScoreMode::Slope => Some(slope),
            ScoreMode::Standard => standardized,
            ScoreMode::Modified => standardized.map(|z| z * r_squared),
            ScoreMode::RightSkewed => standardized.map(|z| z * r_squared * slope),
            ScoreMode::RSquaredPower(p) => standardized.map(|z| z * r_squared.powf(p)),
        }
    }

    /// Entry/exit thresholds used in the research report for this score.
    pub fn default_thresholds(self) -> (f64, f64) {
        match self {
            ScoreMode::Slope => (1.0, 0.8),
            _ => (0.7, -0.7),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndicatorMode {
    pub regression: RegressionMode,
    pub score: ScoreMode,
}

impl fmt::Display for RegressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegressionMode::HighOnLow => write!(f, "high_on_low"),
            RegressionMode::LowOnHigh => write!(f, "low_on_high"),
        }
    }
}

impl fmt::Display for ScoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreMode::Slope => write!(f, "slope"),
            ScoreMode::Standard => write!(f, "standard"),
            ScoreMode::Modified => write!(f, "modified"),
            ScoreMode::RightSkewed => write!(f, "right_skewed"),
            ScoreMode::RSquaredPower(p) => write!(f, "power({})", p),
        }
    }
}

impl FromStr for RegressionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high_on_low" => Ok(RegressionMode::HighOnLow),
            "low_on_high" => Ok(RegressionMode::LowOnHigh),
            other => Err(format!(
                "unknown regression mode '{}' (expected high_on_low or low_on_high)",
                other
            )),
        }
    }
}

impl ScoreMode {
    /// Parse a score name; `power` takes its exponent from `power`.
    pub fn parse(name: &str, power: f64) -> Result<Self, String> {
        match name.trim().to_lowercase().as_str() {
            "slope" => Ok(ScoreMode::Slope),
            "standard" => Ok(ScoreMode::Standard),
            "modified" => Ok(ScoreMode::Modified),
            "right_skewed" => Ok(ScoreMode::RightSkewed),
            "power" => Ok(ScoreMode::RSquaredPower(power)),
            other => Err(format!(
                "unknown score '{}' (expected slope, standard, modified, right_skewed or power)",
                other
            )),
        }
    }
}
