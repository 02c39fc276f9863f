//! Alpha Vantage daily adjusted time series adapter.
//!
//! Always requests the full history and filters to the date range locally.

use crate::domain::error::StockscopeError;
use crate::domain::ohlcv::{PriceSeries, RawBar};
use crate::domain::source::Interval;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
const SERIES_KEY: &str = "Time Series (Daily)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider field name and the column it fills.
const FIELDS: [(&str, &str); 5] = [
    ("1. open", "open"),
    ("2. high", "high"),
    ("3. low", "low"),
    ("4. close", "close"),
    ("6. volume", "volume"),
];

#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(rename = "Time Series (Daily)")]
    series: Option<BTreeMap<String, HashMap<String, String>>>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

pub struct AlphaVantageAdapter {
    client: reqwest::blocking::Client,
    api_key: SecretString,
    base_url: String,
}

impl AlphaVantageAdapter {
    pub fn new(api_key: SecretString) -> Result<Self, StockscopeError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: SecretString,
        base_url: impl Into<String>,
    ) -> Result<Self, StockscopeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StockscopeError::Fetch {
                ticker: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.into(),
        })
    }
}

fn parse_response(ticker: &str, body: &str) -> Result<PriceSeries, StockscopeError> {
    let response: DailyResponse =
        serde_json::from_str(body).map_err(|e| StockscopeError::Fetch {
            ticker: ticker.to_string(),
            reason: format!("unexpected response: {e}"),
        })?;

    let Some(series) = response.series else {
        let detail = response
            .error_message
            .or(response.note)
            .or(response.information)
            .unwrap_or_else(|| "no further detail".to_string());
        return Err(StockscopeError::Provider {
            ticker: ticker.to_string(),
            reason: format!("response missing '{SERIES_KEY}': {detail}"),
        });
    };

    let invalid = |reason: String| StockscopeError::InvalidSeries {
        ticker: ticker.to_string(),
        reason,
    };

    let mut raw = Vec::with_capacity(series.len());
    for (date_str, row) in &series {
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|e| invalid(format!("invalid date '{date_str}': {e}")))?;

        let mut values = [0.0; 5];
        for (slot, (field, column)) in values.iter_mut().zip(FIELDS) {
            let cell = row.get(field).ok_or_else(|| StockscopeError::MissingColumn {
                ticker: ticker.to_string(),
                column: column.to_string(),
            })?;
            *slot = cell
                .trim()
                .parse()
                .map_err(|e| invalid(format!("invalid {column} '{cell}' on {date}: {e}")))?;
        }
        let [open, high, low, close, volume] = values;

        raw.push(RawBar {
            date: Some(date),
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
        });
    }

    PriceSeries::from_unsorted(ticker, raw)
}

impl DataPort for AlphaVantageAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
        interval: Interval,
    ) -> Result<PriceSeries, StockscopeError> {
        if interval != Interval::Daily {
            return Err(StockscopeError::ConfigInvalid {
                section: "data".into(),
                key: "interval".into(),
                reason: format!("alphavantage only provides daily bars, got {interval}"),
            });
        }

        tracing::debug!(ticker, "requesting daily adjusted series");
        let fetch_err = |e: reqwest::Error| StockscopeError::Fetch {
            ticker: ticker.to_string(),
            reason: e.without_url().to_string(),
        };
        let body = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "TIME_SERIES_DAILY_ADJUSTED"),
                ("symbol", ticker),
                ("outputsize", "full"),
                ("apikey", self.api_key.expose_secret()),
            ])
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(fetch_err)?;

        let series = parse_response(ticker, &body)?.between(start, end);
        if series.is_empty() {
            return Err(StockscopeError::NoData {
                ticker: ticker.to_string(),
            });
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn row(close: &str) -> String {
        format!(
            r#"{{"1. open": "100.0", "2. high": "101.0", "3. low": "99.0", "4. close": "{close}",
                "5. adjusted close": "{close}", "6. volume": "1000", "7. dividend amount": "0.0000"}}"#
        )
    }

    #[test]
    fn parses_and_sorts_ascending() {
        let body = format!(
            r#"{{"Meta Data": {{}}, "Time Series (Daily)": {{"2024-01-03": {}, "2024-01-02": {}}}}}"#,
            row("100.5"),
            row("99.5")
        );
        let series = parse_response("IBM", &body).unwrap();
        assert_eq!(series.dates(), vec![d(2), d(3)]);
        assert_eq!(series.closes(), vec![99.5, 100.5]);
        assert_eq!(series.bars()[0].volume, 1000.0);
    }

    #[test]
    fn rate_limit_note_is_provider_error() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        let err = parse_response("IBM", body).unwrap_err();
        assert!(
            matches!(err, StockscopeError::Provider { reason, .. } if reason.contains("call frequency"))
        );
    }

    #[test]
    fn error_message_is_provider_error() {
        let body = r#"{"Error Message": "Invalid API call."}"#;
        let err = parse_response("NOPE", body).unwrap_err();
        assert!(
            matches!(err, StockscopeError::Provider { ticker, reason } if ticker == "NOPE" && reason.contains("Invalid API call"))
        );
    }

    #[test]
    fn missing_field_is_missing_column() {
        let body = r#"{"Time Series (Daily)": {"2024-01-02": {"1. open": "1", "2. high": "1", "3. low": "1", "4. close": "1"}}}"#;
        let err = parse_response("IBM", body).unwrap_err();
        assert!(
            matches!(err, StockscopeError::MissingColumn { column, .. } if column == "volume")
        );
    }

    #[test]
    fn non_numeric_field_is_invalid_series() {
        let body = format!(r#"{{"Time Series (Daily)": {{"2024-01-02": {}}}}}"#, row("n/a"));
        let err = parse_response("IBM", &body).unwrap_err();
        assert!(matches!(err, StockscopeError::InvalidSeries { .. }));
    }

    #[test]
    fn weekly_interval_rejected_before_request() {
        let adapter =
            AlphaVantageAdapter::with_base_url(SecretString::from("demo".to_string()), "http://127.0.0.1:9")
                .unwrap();
        let err = adapter
            .fetch_ohlcv("IBM", d(1), None, Interval::Weekly)
            .unwrap_err();
        assert!(matches!(err, StockscopeError::ConfigInvalid { key, .. } if key == "interval"));
    }
}
