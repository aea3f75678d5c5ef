//! CSV price file adapter.
//!
//! Columns are located by header name (case-insensitive). `date`, `high`,
//! `low` and `close` are required; `open` defaults to the close and `volume`
//! to zero when the column is absent. Dates use `%Y-%m-%d`.

use crate::domain::error::RsrsError;
use crate::domain::ohlcv::PricePoint;
use crate::domain::series::SeriesStore;
use crate::ports::data_port::PricePort;
use chrono::NaiveDate;
use std::fs::File;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: Option<usize>,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, RsrsError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| RsrsError::MalformedInput {
                line: 1,
                reason: format!("missing {} column", name),
            })
        };
        Ok(Self {
            date: require("date")?,
            open: find("open"),
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, source: &str) -> PathBuf {
        self.base_path.join(source)
    }

    fn parse_row(
        record: &csv::StringRecord,
        columns: &Columns,
        line: usize,
    ) -> Result<PricePoint, RsrsError> {
        let field = |index: usize, name: &str| {
            record
                .get(index)
                .map(str::trim)
                .ok_or_else(|| RsrsError::MalformedInput {
                    line,
                    reason: format!("missing {} value", name),
                })
        };
        let number = |index: usize, name: &str| -> Result<f64, RsrsError> {
            field(index, name)?
                .parse()
                .map_err(|e| RsrsError::MalformedInput {
                    line,
                    reason: format!("invalid {} value: {}", name, e),
                })
        };

        let date_str = field(columns.date, "date")?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            RsrsError::MalformedInput {
                line,
                reason: format!("invalid date '{}': {}", date_str, e),
            }
        })?;
        let close = number(columns.close, "close")?;
        let open = match columns.open {
            Some(index) => number(index, "open")?,
            None => close,
        };
        let volume = match columns.volume {
            Some(index) => number(index, "volume")?,
            None => 0.0,
        };

        Ok(PricePoint {
            date,
            open,
            high: number(columns.high, "high")?,
            low: number(columns.low, "low")?,
            close,
            volume,
        })
    }
}

impl PricePort for CsvAdapter {
    fn fetch_series(
        &self,
        source: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<SeriesStore, RsrsError> {
        let path = self.csv_path(source);
        let file = File::open(&path).map_err(|e| RsrsError::Io {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let columns = Columns::from_headers(rdr.headers()?)?;

        let mut points = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let line = i + 2;
            let record = result.map_err(|e| RsrsError::MalformedInput {
                line,
                reason: format!("CSV parse error: {}", e),
            })?;
            points.push(Self::parse_row(&record, &columns, line)?);
        }

        // Row k of the data is line k + 1 of the file.
        let series = SeriesStore::new(points).map_err(|err| match err {
            RsrsError::MalformedInput { line, reason } => RsrsError::MalformedInput {
                line: line + 1,
                reason,
            },
            other => other,
        })?;

        if start.is_none() && end.is_none() {
            Ok(series)
        } else {
            Ok(series.between(start, end))
        }
    }
}
