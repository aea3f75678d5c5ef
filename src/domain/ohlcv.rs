//! Daily price bar.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PricePoint {
    /// Bar with only the fields the indicator needs; open is set to close and volume to zero.
    pub fn hlc(date: NaiveDate, high: f64, low: f64, close: f64) -> Self {
        PricePoint {
            date,
            open: close,
            high,
            low,
            close,
            volume: 0.0,
        }
    }

    /// close / prev_close - 1
    pub fn simple_return(&self, prev_close: f64) -> f64 {
        self.close / prev_close - 1.0
    }

    /// Reason the bar is unusable, if any.
    pub fn defect(&self) -> Option<String> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Some("prices must be finite and positive".to_string());
        }
        if self.high < self.low {
            return Some(format!("high {} below low {}", self.high, self.low));
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Some(format!("invalid volume {}", self.volume));
        }
        None
    }
}
