//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for rsrs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RsrsError {
    #[error("insufficient history: have {available} days, need {required}")]
    InsufficientHistory { available: usize, required: usize },

    #[error("invalid window: {reason}")]
    InvalidWindow { reason: String },

    #[error("invalid thresholds: buy threshold {s1} must be greater than sell threshold {s2}")]
    InvalidThresholds { s1: f64, s2: f64 },

    #[error("invalid cost: {cost_bps} bps")]
    InvalidCost { cost_bps: f64 },

    #[error("undefined metric {metric}: zero-variance denominator")]
    UndefinedMetric { metric: &'static str },

    #[error("malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    #[error("no price for {date}")]
    MissingDate { date: NaiveDate },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("sweep interrupted before this point ran")]
    Interrupted,

    #[error("i/o error: {reason}")]
    Io { reason: String },
}

impl RsrsError {
    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        RsrsError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn config_missing(section: &str, key: &str) -> Self {
        RsrsError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<std::io::Error> for RsrsError {
    fn from(err: std::io::Error) -> Self {
        RsrsError::Io {
            reason: err.to_string(),
        }
    }
}

impl From<csv::Error> for RsrsError {
    fn from(err: csv::Error) -> Self {
        RsrsError::Io {
            reason: format!("csv: {err}"),
        }
    }
}

impl From<&RsrsError> for std::process::ExitCode {
    fn from(err: &RsrsError) -> Self {
        let code: u8 = match err {
            RsrsError::Io { .. } | RsrsError::Interrupted => 1,
            RsrsError::ConfigParse { .. }
            | RsrsError::ConfigMissing { .. }
            | RsrsError::ConfigInvalid { .. } => 2,
            RsrsError::MalformedInput { .. } | RsrsError::MissingDate { .. } => 3,
            RsrsError::InvalidWindow { .. }
            | RsrsError::InvalidThresholds { .. }
            | RsrsError::InvalidCost { .. }
            | RsrsError::UndefinedMetric { .. } => 4,
            RsrsError::InsufficientHistory { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
