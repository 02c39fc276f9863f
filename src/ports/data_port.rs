//! Price data access port trait.

use crate::domain::error::StockscopeError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::source::Interval;
use chrono::NaiveDate;

pub trait DataPort {
    /// Fetch bars for `ticker` from `start` through `end` (today when `None`).
    ///
    /// Implementations return a normalised series: sorted, deduplicated,
    /// without incomplete rows. An empty result is `NoData`, not an empty
    /// series.
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
        interval: Interval,
    ) -> Result<PriceSeries, StockscopeError>;
}
