//! Indicator engine: derives the rolling columns of a price series.

use crate::domain::analysis_config::IndicatorConfig;
use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::indicator::returns::{calculate_log_returns, calculate_returns};
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::volatility::calculate_rolling_volatility;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{OhlcvBar, PriceSeries};

/// A price series together with its derived indicator columns.
///
/// Every indicator series has exactly one point per bar. Column order is:
/// moving averages (short, long), Bollinger triple, return, log return,
/// rolling volatility.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedSeries {
    series: PriceSeries,
    config: IndicatorConfig,
    indicators: Vec<IndicatorSeries>,
}

pub const BASE_COLUMNS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

impl EnrichedSeries {
    pub fn ticker(&self) -> &str {
        self.series.ticker()
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        self.series.bars()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn indicators(&self) -> &[IndicatorSeries] {
        &self.indicators
    }

    pub fn indicator(&self, indicator_type: &IndicatorType) -> Option<&IndicatorSeries> {
        self.indicators
            .iter()
            .find(|s| &s.indicator_type == indicator_type)
    }

    /// The `MA_{window}` column, if this series was enriched with it.
    pub fn moving_average(&self, window: usize) -> Option<&IndicatorSeries> {
        self.indicator(&IndicatorType::Sma(window))
    }

    pub fn bollinger(&self) -> Option<&IndicatorSeries> {
        self.indicators
            .iter()
            .find(|s| matches!(s.indicator_type, IndicatorType::Bollinger { .. }))
    }

    pub fn returns(&self) -> Option<&IndicatorSeries> {
        self.indicator(&IndicatorType::SimpleReturn)
    }

    pub fn log_returns(&self) -> Option<&IndicatorSeries> {
        self.indicator(&IndicatorType::LogReturn)
    }

    pub fn rolling_volatility(&self) -> Option<&IndicatorSeries> {
        self.indicators
            .iter()
            .find(|s| matches!(s.indicator_type, IndicatorType::RollingVolatility { .. }))
    }

    /// Header for a tabular dump: OHLCV columns followed by indicator columns.
    pub fn column_names(&self) -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(
                self.indicators
                    .iter()
                    .flat_map(|s| s.indicator_type.column_names()),
            )
            .collect()
    }

    /// Indicator cells of row `i`, aligned with the tail of `column_names`.
    pub fn indicator_cells(&self, i: usize) -> Vec<Option<f64>> {
        self.indicators.iter().flat_map(|s| s.cells(i)).collect()
    }
}

/// Compute moving averages, Bollinger bands, returns and rolling volatility.
///
/// Never fails: a series shorter than a window leaves that column undefined.
pub fn add_indicators(series: &PriceSeries, config: &IndicatorConfig) -> EnrichedSeries {
    let bars = series.bars();
    let (short, long) = config.ma_windows;

    let mut indicators = vec![calculate_sma(bars, short)];
    if long != short {
        indicators.push(calculate_sma(bars, long));
    }
    indicators.push(calculate_bollinger(bars, config.bb_window, config.bb_std));
    indicators.push(calculate_returns(bars));
    indicators.push(calculate_log_returns(bars));
    indicators.push(calculate_rolling_volatility(
        bars,
        config.volatility_window,
        config.periods_per_year,
    ));

    tracing::debug!(
        ticker = series.ticker(),
        rows = series.len(),
        columns = indicators.len(),
        "computed indicators"
    );

    EnrichedSeries {
        series: series.clone(),
        config: config.clone(),
        indicators,
    }
}
