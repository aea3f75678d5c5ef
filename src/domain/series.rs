//! Validated, immutable daily price series.

use crate::domain::error::RsrsError;
use crate::domain::ohlcv::PricePoint;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Time-ordered price series shared read-only by every computation.
///
/// Construction rejects the whole input if any bar is malformed or dates are
/// not strictly increasing, so downstream code never sees a partial load.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStore {
    points: Vec<PricePoint>,
    date_index: HashMap<NaiveDate, usize>,
}

impl SeriesStore {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, RsrsError> {
        let mut date_index = HashMap::with_capacity(points.len());
        for (i, point) in points.iter().enumerate() {
            if let Some(reason) = point.defect() {
                return Err(RsrsError::MalformedInput { line: i + 1, reason });
            }
            if i > 0 && point.date <= points[i - 1].date {
                return Err(RsrsError::MalformedInput {
                    line: i + 1,
                    reason: format!(
                        "date {} does not follow {}",
                        point.date,
                        points[i - 1].date
                    ),
                });
            }
            date_index.insert(point.date, i);
        }
        Ok(Self { points, date_index })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<&PricePoint> {
        self.points.get(index)
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Sub-series with dates inside `[start, end]`; either bound may be open.
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> SeriesStore {
        let points: Vec<PricePoint> = self
            .points
            .iter()
            .filter(|p| start.is_none_or(|s| p.date >= s) && end.is_none_or(|e| p.date <= e))
            .cloned()
            .collect();
        let date_index = points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.date, i))
            .collect();
        SeriesStore { points, date_index }
    }
}
