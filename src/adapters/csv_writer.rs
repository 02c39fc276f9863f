//! CSV artifact writers.
//!
//! Undefined values are written as empty cells.

use crate::domain::correlation::CorrelationMatrix;
use crate::domain::enriched::EnrichedSeries;
use crate::domain::error::StockscopeError;
use crate::domain::summary::AssetSummary;
use std::fs;
use std::path::{Path, PathBuf};

pub const SUMMARY_FILE: &str = "asset_summary.csv";
pub const CORRELATION_FILE: &str = "asset_correlation.csv";
pub const SUMMARY_HEADER: [&str; 5] = [
    "ticker",
    "trend",
    "total_return",
    "annualized_volatility",
    "latest_close",
];

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn writer(output_dir: &Path, file_name: &str) -> Result<(csv::Writer<fs::File>, PathBuf), StockscopeError> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(file_name);
    Ok((csv::Writer::from_path(&path)?, path))
}

/// `{TICKER}_enriched_prices.csv`: OHLCV plus every indicator column.
pub fn write_enriched_csv(
    enriched: &EnrichedSeries,
    output_dir: &Path,
) -> Result<PathBuf, StockscopeError> {
    let (mut wtr, path) = writer(
        output_dir,
        &format!("{}_enriched_prices.csv", enriched.ticker()),
    )?;
    wtr.write_record(enriched.column_names())?;

    for (i, bar) in enriched.bars().iter().enumerate() {
        let mut record = vec![
            bar.date.to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ];
        record.extend(enriched.indicator_cells(i).into_iter().map(cell));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(path)
}

/// `asset_summary.csv`, rows in the order given.
pub fn write_summary_csv(
    summaries: &[AssetSummary],
    output_dir: &Path,
) -> Result<PathBuf, StockscopeError> {
    let (mut wtr, path) = writer(output_dir, SUMMARY_FILE)?;
    wtr.write_record(SUMMARY_HEADER)?;
    for s in summaries {
        wtr.write_record([
            s.ticker.clone(),
            s.trend.to_string(),
            s.total_return.to_string(),
            cell(s.annualized_volatility),
            s.latest_close.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(path)
}

/// `asset_correlation.csv`: square matrix with a leading ticker column.
pub fn write_correlation_csv(
    matrix: &CorrelationMatrix,
    output_dir: &Path,
) -> Result<PathBuf, StockscopeError> {
    let (mut wtr, path) = writer(output_dir, CORRELATION_FILE)?;

    let mut header = vec!["ticker".to_string()];
    header.extend(matrix.tickers.iter().cloned());
    wtr.write_record(&header)?;

    for (i, ticker) in matrix.tickers.iter().enumerate() {
        let mut record = vec![ticker.clone()];
        record.extend(matrix.row(i).iter().copied().map(cell));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(path)
}
