//! Core domain types and logic.

pub mod ohlcv;
pub mod series;
pub mod rolling;
pub mod indicator;
pub mod filter;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod sweep;
pub mod score_analysis;
pub mod comparison;
pub mod config_validation;
pub mod error;
