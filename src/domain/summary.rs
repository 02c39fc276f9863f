//! Per-asset summary: trend, total return, annualized volatility.

use crate::domain::enriched::EnrichedSeries;
use crate::domain::error::StockscopeError;
use crate::domain::stats::sample_std;
use crate::domain::trend::{trend_label, Trend};

#[derive(Debug, Clone, PartialEq)]
pub struct AssetSummary {
    pub ticker: String,
    pub trend: Trend,
    pub total_return: f64,
    /// `None` when fewer than two log returns are defined.
    pub annualized_volatility: Option<f64>,
    pub latest_close: f64,
}

pub fn summarize_asset(
    enriched: &EnrichedSeries,
    ticker: &str,
    short_ma: usize,
    long_ma: usize,
) -> Result<AssetSummary, StockscopeError> {
    let bars = enriched.bars();
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return Err(StockscopeError::EmptySeries {
            ticker: ticker.to_string(),
        });
    };

    let log_returns: Vec<f64> = enriched
        .log_returns()
        .map(|s| s.simple_values().into_iter().flatten().collect())
        .unwrap_or_default();
    let annualization = enriched.config().periods_per_year.sqrt();
    let annualized_volatility = sample_std(&log_returns).map(|sd| sd * annualization);

    Ok(AssetSummary {
        ticker: ticker.to_string(),
        trend: trend_label(enriched, short_ma, long_ma),
        total_return: last.close / first.close - 1.0,
        annualized_volatility,
        latest_close: last.close,
    })
}
