#![allow(dead_code)]

use chrono::NaiveDate;
pub use stockscope::domain::ohlcv::{OhlcvBar, PriceSeries};
use stockscope::domain::analysis_config::IndicatorConfig;
use stockscope::domain::error::StockscopeError;
use stockscope::domain::source::Interval;
use stockscope::ports::data_port::DataPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    /// Tickers in the order they were requested.
    pub requests: RefCell<Vec<String>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
        _interval: Interval,
    ) -> Result<PriceSeries, StockscopeError> {
        self.requests.borrow_mut().push(ticker.to_string());
        if let Some(reason) = self.errors.get(ticker) {
            return Err(StockscopeError::Fetch {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(ticker).cloned().unwrap_or_default();
        let series = PriceSeries::new(ticker, bars)?.between(start, end);
        if series.is_empty() {
            return Err(StockscopeError::NoData {
                ticker: ticker.to_string(),
            });
        }
        Ok(series)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date_str: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

/// Consecutive calendar days with the given closes.
pub fn bars_from_closes(start_date: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + chrono::Duration::days(i as i64),
            open: close * 0.99,
            high: close * 1.01,
            low: close * 0.98,
            close,
            volume: 1_000_000.0,
        })
        .collect()
}

/// Linear ramp from `from` to `to` over `count` rows.
pub fn linear_closes(from: f64, to: f64, count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| from + (to - from) * i as f64 / (count - 1).max(1) as f64)
        .collect()
}

/// Deterministic zig-zag around a drift, for non-degenerate returns.
pub fn wavy_closes(start: f64, count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| start + i as f64 * 0.2 + if i % 3 == 0 { 1.5 } else { -0.5 })
        .collect()
}

pub fn sample_request(tickers: &[&str], output_dir: &Path) -> stockscope::cli::AnalysisRequest {
    stockscope::cli::AnalysisRequest {
        tickers: tickers.iter().map(|t| t.to_string()).collect(),
        start: date(2024, 1, 1),
        end: None,
        interval: Interval::Daily,
        indicators: IndicatorConfig::default(),
        output_dir: output_dir.to_path_buf(),
    }
}
