//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod analysis_config;
pub mod enriched;
pub mod trend;
pub mod summary;
pub mod correlation;
pub mod stats;
pub mod source;
pub mod universe;
pub mod config_validation;
pub mod error;
