//! Period-over-period returns of closing prices.
//!
//! RETURN[t]     = (C[t] - C[t-1]) / C[t-1]
//! LOG_RETURN[t] = ln(C[t] / C[t-1])
//!
//! Both are undefined at t=0, and wherever the previous close is zero (the
//! ratio is not finite).

use crate::domain::indicator::{simple_series, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

/// Simple return for consecutive closes `prev -> curr`.
pub fn simple_return(prev: f64, curr: f64) -> Option<f64> {
    let r = (curr - prev) / prev;
    r.is_finite().then_some(r)
}

/// Log return for consecutive closes `prev -> curr`.
pub fn log_return(prev: f64, curr: f64) -> Option<f64> {
    let r = (curr / prev).ln();
    r.is_finite().then_some(r)
}

/// Apply `f` to each consecutive pair, with a leading `None`.
pub fn pairwise(closes: &[f64], f: fn(f64, f64) -> Option<f64>) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(closes.windows(2).map(|w| f(w[0], w[1])));
    out
}

pub fn calculate_returns(bars: &[OhlcvBar]) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
    simple_series(
        IndicatorType::SimpleReturn,
        &dates,
        pairwise(&closes, simple_return),
    )
}

pub fn calculate_log_returns(bars: &[OhlcvBar]) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
    simple_series(
        IndicatorType::LogReturn,
        &dates,
        pairwise(&closes, log_return),
    )
}
