//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values, aligned 1:1 with bars
//!
//! A point whose value is `None` is undefined (warmup rows, or a window that
//! contains an undefined input).

pub mod bollinger;
pub mod returns;
pub mod sma;
pub mod stddev;
pub mod volatility;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<IndicatorValue>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Bollinger { upper: f64, middle: f64, lower: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorType {
    Sma(usize),
    Stddev(usize),
    Bollinger { period: usize, multiplier: f64 },
    SimpleReturn,
    LogReturn,
    RollingVolatility { period: usize, periods_per_year: f64 },
}

impl IndicatorType {
    /// Output column names, in the order `IndicatorSeries::cells` yields them.
    pub fn column_names(&self) -> Vec<String> {
        match self {
            IndicatorType::Sma(period) => vec![format!("MA_{}", period)],
            IndicatorType::Stddev(period) => vec![format!("STD_{}", period)],
            IndicatorType::Bollinger { period, .. } => vec![
                format!("BB_MID_{}", period),
                format!("BB_UPPER_{}", period),
                format!("BB_LOWER_{}", period),
            ],
            IndicatorType::SimpleReturn => vec!["Return".to_string()],
            IndicatorType::LogReturn => vec!["LogReturn".to_string()],
            IndicatorType::RollingVolatility { period, .. } => {
                vec![format!("RollingVol_{}", period)]
            }
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Bollinger { period, multiplier } => {
                write!(f, "BOLLINGER({},{})", period, multiplier)
            }
            IndicatorType::SimpleReturn => write!(f, "RETURN"),
            IndicatorType::LogReturn => write!(f, "LOG_RETURN"),
            IndicatorType::RollingVolatility {
                period,
                periods_per_year,
            } => write!(f, "ROLLING_VOL({},{})", period, periods_per_year),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Scalar value at row `i`, or `None` if undefined or not a scalar series.
    pub fn simple(&self, i: usize) -> Option<f64> {
        match self.values.get(i)?.value? {
            IndicatorValue::Simple(v) => Some(v),
            IndicatorValue::Bollinger { .. } => None,
        }
    }

    pub fn simple_values(&self) -> Vec<Option<f64>> {
        (0..self.values.len()).map(|i| self.simple(i)).collect()
    }

    /// Flattened column values at row `i`, matching `column_names`.
    pub fn cells(&self, i: usize) -> Vec<Option<f64>> {
        let width = self.indicator_type.column_names().len();
        match self.values.get(i).and_then(|p| p.value) {
            Some(IndicatorValue::Simple(v)) => vec![Some(v)],
            Some(IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            }) => vec![Some(middle), Some(upper), Some(lower)],
            None => vec![None; width],
        }
    }

    /// Number of rows with a defined value.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|p| p.value.is_some()).count()
    }
}

/// Build a scalar series from per-row optional values.
pub(crate) fn simple_series(
    indicator_type: IndicatorType,
    dates: &[NaiveDate],
    values: Vec<Option<f64>>,
) -> IndicatorSeries {
    let values = dates
        .iter()
        .zip(values)
        .map(|(&date, v)| IndicatorPoint {
            date,
            value: v.map(IndicatorValue::Simple),
        })
        .collect();
    IndicatorSeries {
        indicator_type,
        values,
    }
}
