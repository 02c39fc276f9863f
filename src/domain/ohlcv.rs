//! OHLCV bar and price series representation.

use crate::domain::error::StockscopeError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// close >= open
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
    }
}

/// A raw provider row before validation. Any field may be absent.
#[derive(Debug, Clone, Default)]
pub struct RawBar {
    pub date: Option<NaiveDate>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl RawBar {
    fn complete(&self) -> Option<OhlcvBar> {
        Some(OhlcvBar {
            date: self.date?,
            open: self.open?,
            high: self.high?,
            low: self.low?,
            close: self.close?,
            volume: self.volume?,
        })
    }
}

/// Date-ordered OHLCV bars for one ticker.
///
/// Dates are strictly increasing and every numeric field is finite and
/// non-negative. Gaps (weekends, holidays) are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, StockscopeError> {
        let ticker = ticker.into();

        for bar in &bars {
            for (name, value) in bar.fields() {
                if !value.is_finite() || value < 0.0 {
                    return Err(StockscopeError::InvalidSeries {
                        ticker,
                        reason: format!("{} on {} is {}", name, bar.date, value),
                    });
                }
            }
        }

        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(StockscopeError::InvalidSeries {
                ticker,
                reason: format!(
                    "dates not strictly increasing ({} then {})",
                    pair[0].date, pair[1].date
                ),
            });
        }

        Ok(Self { ticker, bars })
    }

    /// Normalise raw provider rows: drop incomplete rows, sort by date and
    /// keep the last row seen for a duplicated date.
    pub fn from_unsorted(
        ticker: impl Into<String>,
        raw: Vec<RawBar>,
    ) -> Result<Self, StockscopeError> {
        let ticker = ticker.into();
        let total = raw.len();

        let mut bars: Vec<OhlcvBar> = raw.iter().filter_map(RawBar::complete).collect();
        if bars.len() < total {
            tracing::warn!(
                ticker = %ticker,
                dropped = total - bars.len(),
                "dropped rows with missing values"
            );
        }

        // stable sort keeps provider order within a date
        bars.sort_by_key(|b| b.date);
        let before = bars.len();
        let mut deduped: Vec<OhlcvBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        if deduped.len() < before {
            tracing::warn!(
                ticker = %ticker,
                duplicates = before - deduped.len(),
                "collapsed duplicate dates"
            );
        }

        Self::new(ticker, deduped)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Keep bars with `start <= date <= end`.
    pub fn between(self, start: NaiveDate, end: Option<NaiveDate>) -> Self {
        let bars = self
            .bars
            .into_iter()
            .filter(|b| b.date >= start && end.is_none_or(|e| b.date <= e))
            .collect();
        Self {
            ticker: self.ticker,
            bars,
        }
    }
}
