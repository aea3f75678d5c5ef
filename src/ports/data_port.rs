//! Price data access port trait.

use crate::domain::error::RsrsError;
use crate::domain::series::SeriesStore;
use chrono::NaiveDate;

pub trait PricePort {
    /// Validated series for `source`, restricted to `[start, end]` when given.
    ///
    /// The whole source is validated before the date filter applies, so a
    /// malformed row outside the range still rejects the load.
    fn fetch_series(
        &self,
        source: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<SeriesStore, RsrsError>;

    /// First date, last date and row count of `source`, or `None` if it is empty.
    fn get_data_range(&self, source: &str) -> Result<Option<(NaiveDate, NaiveDate, usize)>, RsrsError> {
        let series = self.fetch_series(source, None, None)?;
        Ok(series
            .first_date()
            .zip(series.last_date())
            .map(|(first, last)| (first, last, series.len())))
    }
}
