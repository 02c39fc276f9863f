//! Concrete adapter implementations for ports.

#[cfg(feature = "fetch")]
pub mod alphavantage_adapter;
pub mod csv_adapter;
pub mod csv_writer;
pub mod file_config_adapter;
pub mod markdown_report;
pub mod svg_chart;
#[cfg(feature = "fetch")]
pub mod yahoo_adapter;
