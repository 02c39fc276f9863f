//! Configuration validation.
//!
//! Checks the `[analysis]` and `[data]` sections before any data is fetched.
//! Keys are optional; only values that are present are checked, and absent
//! keys fall back to the `IndicatorConfig` defaults.

use crate::domain::error::StockscopeError;
use crate::domain::source::{DataSource, Interval};
use crate::ports::config_port::ConfigPort;

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), StockscopeError> {
    validate_window(config, "ma_short", 1)?;
    validate_window(config, "ma_long", 1)?;
    validate_window(config, "bb_window", 2)?;
    validate_window(config, "volatility_window", 2)?;
    validate_positive(config, "bb_std")?;
    validate_positive(config, "periods_per_year")?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), StockscopeError> {
    if let Some(source) = config.get_string("data", "source") {
        source
            .parse::<DataSource>()
            .map_err(|reason| invalid("data", "source", reason))?;
    }
    if let Some(interval) = config.get_string("data", "interval") {
        interval
            .parse::<Interval>()
            .map_err(|reason| invalid("data", "interval", reason))?;
    }
    Ok(())
}

/// Read an `[analysis]` window, rejecting non-integers instead of defaulting.
pub fn read_window(
    config: &dyn ConfigPort,
    key: &str,
    default: usize,
) -> Result<usize, StockscopeError> {
    match config.get_string("analysis", key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| invalid("analysis", key, format!("{key} must be a whole number"))),
    }
}

pub fn read_number(
    config: &dyn ConfigPort,
    key: &str,
    default: f64,
) -> Result<f64, StockscopeError> {
    match config.get_string("analysis", key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| invalid("analysis", key, format!("{key} must be a number"))),
    }
}

fn validate_window(config: &dyn ConfigPort, key: &str, min: usize) -> Result<(), StockscopeError> {
    let value = read_window(config, key, min)?;
    if value < min {
        return Err(invalid(
            "analysis",
            key,
            format!("{key} must be at least {min}"),
        ));
    }
    Ok(())
}

fn validate_positive(config: &dyn ConfigPort, key: &str) -> Result<(), StockscopeError> {
    let value = read_number(config, key, 1.0)?;
    if value <= 0.0 {
        return Err(invalid("analysis", key, format!("{key} must be positive")));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: String) -> StockscopeError {
    StockscopeError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}
