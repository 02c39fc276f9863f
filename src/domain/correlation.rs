//! Cross-asset return correlation.
//!
//! Close prices are inner-joined on date, turned into simple returns, and
//! correlated pairwise (Pearson).

use crate::domain::enriched::EnrichedSeries;
use crate::domain::error::StockscopeError;
use crate::domain::indicator::returns::{pairwise, simple_return};
use crate::domain::stats::pearson;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Close prices of one ticker keyed by date.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseSeries {
    pub ticker: String,
    pub closes: BTreeMap<NaiveDate, f64>,
}

impl CloseSeries {
    pub fn new(ticker: impl Into<String>, points: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        Self {
            ticker: ticker.into(),
            closes: points.into_iter().collect(),
        }
    }

    pub fn from_enriched(enriched: &EnrichedSeries) -> Self {
        Self::new(
            enriched.ticker(),
            enriched.bars().iter().map(|b| (b.date, b.close)),
        )
    }
}

/// Close table restricted to the dates every ticker has.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedCloses {
    pub tickers: Vec<String>,
    pub dates: Vec<NaiveDate>,
    /// One column per ticker, each `dates.len()` long.
    pub columns: Vec<Vec<f64>>,
}

pub fn align_closes(series: &[CloseSeries]) -> Result<AlignedCloses, StockscopeError> {
    let tickers: Vec<String> = series.iter().map(|s| s.ticker.clone()).collect();

    let mut common: Option<BTreeSet<NaiveDate>> = None;
    for s in series {
        let dates: BTreeSet<NaiveDate> = s.closes.keys().copied().collect();
        common = Some(match common {
            None => dates,
            Some(acc) => acc.intersection(&dates).copied().collect(),
        });
    }

    let dates: Vec<NaiveDate> = common.unwrap_or_default().into_iter().collect();
    if dates.is_empty() {
        return Err(StockscopeError::NoCommonDates { tickers });
    }

    let columns = series
        .iter()
        .map(|s| dates.iter().map(|d| s.closes[d]).collect())
        .collect();

    Ok(AlignedCloses {
        tickers,
        dates,
        columns,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub tickers: Vec<String>,
    /// Row-major, `tickers.len()` squared. `None` is undefined.
    values: Vec<Vec<Option<f64>>>,
    /// Return rows the coefficients were computed over.
    pub observations: usize,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i)?.get(j).copied().flatten()
    }

    pub fn by_ticker(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.tickers.iter().position(|t| t == a)?;
        let j = self.tickers.iter().position(|t| t == b)?;
        self.get(i, j)
    }

    pub fn row(&self, i: usize) -> &[Option<f64>] {
        &self.values[i]
    }
}

/// Pearson correlation of aligned simple returns.
///
/// Rows where any ticker's return is undefined are dropped first. The
/// diagonal is 1.0 even for a constant-price ticker, whose correlation with
/// every other ticker is undefined.
pub fn correlate_aligned(aligned: &AlignedCloses) -> CorrelationMatrix {
    let returns: Vec<Vec<Option<f64>>> = aligned
        .columns
        .iter()
        .map(|c| pairwise(c, simple_return))
        .collect();

    let complete_rows: Vec<usize> = (0..aligned.dates.len())
        .filter(|&r| returns.iter().all(|col| col[r].is_some()))
        .collect();
    let clean: Vec<Vec<f64>> = returns
        .iter()
        .map(|col| complete_rows.iter().filter_map(|&r| col[r]).collect())
        .collect();

    let n = aligned.tickers.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let r = pearson(&clean[i], &clean[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        tickers: aligned.tickers.clone(),
        values,
        observations: complete_rows.len(),
    }
}

pub fn compute_correlation(series: &[CloseSeries]) -> Result<CorrelationMatrix, StockscopeError> {
    let aligned = align_closes(series)?;
    let matrix = correlate_aligned(&aligned);
    tracing::debug!(
        tickers = matrix.len(),
        dates = aligned.dates.len(),
        observations = matrix.observations,
        "computed return correlation"
    );
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn closes(ticker: &str, points: &[(u32, f64)]) -> CloseSeries {
        CloseSeries::new(ticker, points.iter().map(|&(day, c)| (d(day), c)))
    }

    #[test]
    fn align_keeps_common_dates_only() {
        let a = closes("A", &[(1, 10.0), (2, 11.0), (3, 12.0)]);
        let b = closes("B", &[(2, 20.0), (3, 21.0), (4, 22.0)]);
        let aligned = align_closes(&[a, b]).unwrap();
        assert_eq!(aligned.dates, vec![d(2), d(3)]);
        assert_eq!(aligned.columns, vec![vec![11.0, 12.0], vec![20.0, 21.0]]);
    }

    #[test]
    fn disjoint_histories_fail() {
        let a = closes("A", &[(1, 10.0), (2, 11.0)]);
        let b = closes("B", &[(3, 20.0), (4, 21.0)]);
        let err = compute_correlation(&[a, b]).unwrap_err();
        assert!(matches!(err, StockscopeError::NoCommonDates { tickers } if tickers == ["A", "B"]));
    }

    #[test]
    fn identical_series_correlate_exactly() {
        let pts = [(1, 100.0), (2, 101.0), (3, 99.0), (4, 103.0), (5, 102.5)];
        let m = compute_correlation(&[closes("A", &pts), closes("B", &pts)]).unwrap();
        assert_eq!(m.get(0, 1), Some(1.0));
        assert_eq!(m.get(1, 0), Some(1.0));
        assert_eq!(m.observations, 4);
    }

    #[test]
    fn opposite_moves_correlate_negatively() {
        let a = closes("A", &[(1, 100.0), (2, 110.0), (3, 100.0), (4, 110.0)]);
        let b = closes("B", &[(1, 100.0), (2, 90.0), (3, 100.0), (4, 90.0)]);
        let m = compute_correlation(&[a, b]).unwrap();
        assert!(m.get(0, 1).unwrap() < -0.9);
    }

    #[test]
    fn matches_hand_computed_pearson() {
        let a = closes("A", &[(1, 10.0), (2, 11.0), (3, 10.5), (4, 12.0)]);
        let b = closes("B", &[(1, 20.0), (2, 20.5), (3, 21.5), (4, 21.0)]);
        let m = compute_correlation(&[a, b]).unwrap();

        let ra = [0.1, 10.5 / 11.0 - 1.0, 12.0 / 10.5 - 1.0];
        let rb = [0.025, 21.5 / 20.5 - 1.0, 21.0 / 21.5 - 1.0];
        assert_relative_eq!(m.get(0, 1).unwrap(), pearson(&ra, &rb).unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn constant_price_is_undefined_off_diagonal() {
        let a = closes("A", &[(1, 50.0), (2, 50.0), (3, 50.0)]);
        let b = closes("B", &[(1, 10.0), (2, 11.0), (3, 10.0)]);
        let m = compute_correlation(&[a, b]).unwrap();
        assert_eq!(m.get(0, 0), Some(1.0));
        assert_eq!(m.get(1, 1), Some(1.0));
        assert_eq!(m.get(0, 1), None);
        assert_eq!(m.get(1, 0), None);
    }

    #[test]
    fn single_common_date_has_no_observations() {
        let a = closes("A", &[(1, 10.0), (2, 11.0)]);
        let b = closes("B", &[(2, 20.0), (3, 21.0)]);
        let m = compute_correlation(&[a, b]).unwrap();
        assert_eq!(m.observations, 0);
        assert_eq!(m.get(0, 1), None);
        assert_eq!(m.get(0, 0), Some(1.0));
    }

    #[test]
    fn symmetric_with_three_tickers() {
        let a = closes("A", &[(1, 10.0), (2, 11.0), (3, 10.5), (4, 12.0), (5, 11.0)]);
        let b = closes("B", &[(1, 20.0), (2, 20.5), (3, 21.5), (4, 21.0), (5, 22.0)]);
        let c = closes("C", &[(1, 5.0), (2, 4.5), (3, 4.8), (4, 5.1), (5, 5.0)]);
        let m = compute_correlation(&[a, b, c]).unwrap();
        for i in 0..3 {
            assert_eq!(m.get(i, i), Some(1.0));
            for j in 0..3 {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
        assert_eq!(m.by_ticker("A", "C"), m.get(0, 2));
        assert_eq!(m.tickers, vec!["A", "B", "C"]);
    }
}
