//! Rolling annualized volatility of log returns.
//!
//! VOL(n)[i] = sample_std(LOG_RETURN[i-n+1..=i]) * sqrt(periods_per_year)
//! A window containing an undefined log return is undefined, so the first n
//! rows are undefined (log return itself needs one prior close).

use crate::domain::indicator::returns::{log_return, pairwise};
use crate::domain::indicator::{simple_series, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::stats::sample_std;

/// Rolling sample std over optional inputs; any `None` in the window yields
/// `None`.
pub fn rolling_sample_std(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                return None;
            }
            let window: Option<Vec<f64>> = values[i + 1 - period..=i].iter().copied().collect();
            sample_std(&window?)
        })
        .collect()
}

pub fn calculate_rolling_volatility(
    bars: &[OhlcvBar],
    period: usize,
    periods_per_year: f64,
) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
    let factor = periods_per_year.sqrt();

    let values = rolling_sample_std(&pairwise(&closes, log_return), period)
        .into_iter()
        .map(|sd| sd.map(|v| v * factor))
        .collect();

    simple_series(
        IndicatorType::RollingVolatility {
            period,
            periods_per_year,
        },
        &dates,
        values,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn rolling_std_skips_windows_with_gaps() {
        let values = [None, Some(1.0), Some(2.0), Some(3.0)];
        let out = rolling_sample_std(&values, 2);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_relative_eq!(out[2].unwrap(), 0.5_f64.sqrt());
        assert_relative_eq!(out[3].unwrap(), 0.5_f64.sqrt());
    }

    #[test]
    fn first_period_rows_undefined() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + (i % 3) as f64).collect();
        let series = calculate_rolling_volatility(&make_bars(&prices), 20, 252.0);

        for i in 0..20 {
            assert_eq!(series.simple(i), None, "row {i} should be undefined");
        }
        for i in 20..30 {
            assert!(series.simple(i).is_some(), "row {i} should be defined");
        }
    }

    #[test]
    fn annualizes_with_sqrt_periods() {
        let prices = [100.0, 110.0, 99.0, 105.0];
        let bars = make_bars(&prices);
        let daily = calculate_rolling_volatility(&bars, 3, 1.0);
        let yearly = calculate_rolling_volatility(&bars, 3, 252.0);

        let logs: Vec<f64> = prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
        let expected = sample_std(&logs).unwrap();
        assert_relative_eq!(daily.simple(3).unwrap(), expected, epsilon = 1e-12);
        assert_relative_eq!(
            yearly.simple(3).unwrap(),
            expected * 252.0_f64.sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn constant_prices_have_zero_volatility() {
        let series = calculate_rolling_volatility(&make_bars(&[50.0; 25]), 20, 252.0);
        assert_eq!(series.simple(24), Some(0.0));
    }
}
