//! Chart rendering port trait.

use crate::domain::correlation::CorrelationMatrix;
use crate::domain::enriched::EnrichedSeries;
use crate::domain::error::StockscopeError;
use std::path::{Path, PathBuf};

/// Each method writes one chart file into `output_dir` and returns its path.
pub trait ChartPort {
    /// `{TICKER}_candlestick`: price candles, moving averages, Bollinger
    /// bands and a volume panel.
    fn candlestick(
        &self,
        enriched: &EnrichedSeries,
        output_dir: &Path,
    ) -> Result<PathBuf, StockscopeError>;

    /// `{TICKER}_rolling_volatility`
    fn rolling_volatility(
        &self,
        enriched: &EnrichedSeries,
        output_dir: &Path,
    ) -> Result<PathBuf, StockscopeError>;

    /// `asset_correlation_heatmap`
    fn correlation_heatmap(
        &self,
        matrix: &CorrelationMatrix,
        output_dir: &Path,
    ) -> Result<PathBuf, StockscopeError>;
}
