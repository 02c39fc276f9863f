//! Yahoo Finance chart API data adapter.
//!
//! Fetches raw (unadjusted) OHLCV bars over a blocking HTTP client. The date
//! range is inclusive on both ends; an open end means "through now".

use crate::domain::error::StockscopeError;
use crate::domain::ohlcv::{PriceSeries, RawBar};
use crate::domain::source::Interval;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, StockscopeError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, StockscopeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StockscopeError::Fetch {
                ticker: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn build_url(&self, ticker: &str, period1: i64, period2: i64, interval: Interval) -> String {
        format!(
            "{}/{}?period1={}&period2={}&interval={}&events=history",
            self.base_url, ticker, period1, period2, interval
        )
    }
}

/// Unix seconds for midnight UTC at the start of `date`.
fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// `period1`/`period2` for an inclusive `[start, end]` range.
fn period_bounds(start: NaiveDate, end: Option<NaiveDate>) -> (i64, i64) {
    let period2 = match end.and_then(|e| e.checked_add_days(Days::new(1))) {
        Some(after_end) => midnight_timestamp(after_end),
        None => Utc::now().timestamp(),
    };
    (midnight_timestamp(start), period2)
}

/// Decode a chart API body into a normalised series.
fn parse_response(ticker: &str, body: &str) -> Result<PriceSeries, StockscopeError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| StockscopeError::Fetch {
            ticker: ticker.to_string(),
            reason: format!("unexpected response: {e}"),
        })?;

    if let Some(error) = response.chart.error {
        return Err(StockscopeError::Provider {
            ticker: ticker.to_string(),
            reason: format!("{}: {}", error.code, error.description),
        });
    }

    let no_data = || StockscopeError::NoData {
        ticker: ticker.to_string(),
    };
    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(no_data)?;
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
    let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

    let raw: Vec<RawBar> = data
        .timestamp
        .iter()
        .enumerate()
        .map(|(i, &ts)| RawBar {
            date: DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()),
            open: quote.open.get(i).copied().flatten(),
            high: quote.high.get(i).copied().flatten(),
            low: quote.low.get(i).copied().flatten(),
            close: quote.close.get(i).copied().flatten(),
            volume: quote.volume.get(i).copied().flatten(),
        })
        .collect();

    let series = PriceSeries::from_unsorted(ticker, raw)?;
    if series.is_empty() {
        return Err(no_data());
    }
    Ok(series)
}

impl DataPort for YahooAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
        interval: Interval,
    ) -> Result<PriceSeries, StockscopeError> {
        let (period1, period2) = period_bounds(start, end);
        let url = self.build_url(ticker, period1, period2, interval);
        tracing::debug!(ticker, %url, "requesting chart");

        let fetch_err = |e: reqwest::Error| StockscopeError::Fetch {
            ticker: ticker.to_string(),
            reason: e.to_string(),
        };
        let response = self.client.get(&url).send().map_err(fetch_err)?;
        let status = response.status();
        let body = response.text().map_err(fetch_err)?;

        // error responses still carry a chart.error body worth surfacing
        match parse_response(ticker, &body) {
            Err(StockscopeError::Fetch { .. }) if !status.is_success() => {
                Err(StockscopeError::Fetch {
                    ticker: ticker.to_string(),
                    reason: format!("HTTP {status}"),
                })
            }
            other => other,
        }
    }
}
