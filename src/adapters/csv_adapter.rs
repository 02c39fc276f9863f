//! Local CSV file data adapter.
//!
//! Reads `{TICKER}.csv` from a directory. Columns are located by header name
//! (case-insensitive), so extra columns and any column order are accepted.

use crate::domain::error::StockscopeError;
use crate::domain::ohlcv::{PriceSeries, RawBar};
use crate::domain::source::Interval;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

const REQUIRED_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}.csv"))
    }
}

/// Column positions of the required fields, in `REQUIRED_COLUMNS` order.
fn locate_columns(
    ticker: &str,
    headers: &csv::StringRecord,
) -> Result<[usize; 6], StockscopeError> {
    let mut positions = [0usize; 6];
    for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| StockscopeError::MissingColumn {
                ticker: ticker.to_string(),
                column: name.to_string(),
            })?;
    }
    Ok(positions)
}

/// Blank cells are missing values; anything else must parse.
fn parse_cell(ticker: &str, column: &str, raw: Option<&str>) -> Result<Option<f64>, StockscopeError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .map(Some)
            .map_err(|e| StockscopeError::InvalidSeries {
                ticker: ticker.to_string(),
                reason: format!("invalid {column} value '{s}': {e}"),
            }),
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
        interval: Interval,
    ) -> Result<PriceSeries, StockscopeError> {
        let path = self.csv_path(ticker);
        tracing::debug!(ticker, path = %path.display(), %interval, "reading price file");
        let content = fs::read_to_string(&path).map_err(|e| StockscopeError::Fetch {
            ticker: ticker.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let [date_col, open_col, high_col, low_col, close_col, volume_col] =
            locate_columns(ticker, rdr.headers()?)?;

        let mut raw = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let date = match record.get(date_col).map(str::trim) {
                None | Some("") => None,
                Some(s) => Some(NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
                    StockscopeError::InvalidSeries {
                        ticker: ticker.to_string(),
                        reason: format!("invalid date '{s}': {e}"),
                    }
                })?),
            };
            raw.push(RawBar {
                date,
                open: parse_cell(ticker, "open", record.get(open_col))?,
                high: parse_cell(ticker, "high", record.get(high_col))?,
                low: parse_cell(ticker, "low", record.get(low_col))?,
                close: parse_cell(ticker, "close", record.get(close_col))?,
                volume: parse_cell(ticker, "volume", record.get(volume_col))?,
            });
        }

        let series = PriceSeries::from_unsorted(ticker, raw)?.between(start, end);
        if series.is_empty() {
            return Err(StockscopeError::NoData {
                ticker: ticker.to_string(),
            });
        }
        Ok(series)
    }
}
