//! Domain error types.

use crate::domain::universe::UniverseError;

/// Top-level error type for stockscope.
#[derive(Debug, thiserror::Error)]
pub enum StockscopeError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    InvalidTickers(#[from] UniverseError),

    #[error("failed to fetch {ticker}: {reason}")]
    Fetch { ticker: String, reason: String },

    #[error("provider error for {ticker}: {reason}")]
    Provider { ticker: String, reason: String },

    #[error("no price rows for {ticker}")]
    NoData { ticker: String },

    #[error("missing {column} column for {ticker}")]
    MissingColumn { ticker: String, column: String },

    #[error("invalid price series for {ticker}: {reason}")]
    InvalidSeries { ticker: String, reason: String },

    #[error("cannot summarize {ticker}: series has no rows")]
    EmptySeries { ticker: String },

    #[error("no overlapping dates across tickers: {}", tickers.join(", "))]
    NoCommonDates { tickers: Vec<String> },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StockscopeError> for std::process::ExitCode {
    fn from(err: &StockscopeError) -> Self {
        let code: u8 = match err {
            StockscopeError::Io(_) | StockscopeError::Csv(_) => 1,
            StockscopeError::ConfigParse { .. }
            | StockscopeError::ConfigMissing { .. }
            | StockscopeError::ConfigInvalid { .. }
            | StockscopeError::InvalidTickers(_) => 2,
            StockscopeError::Fetch { .. } | StockscopeError::Provider { .. } => 3,
            StockscopeError::MissingColumn { .. } | StockscopeError::InvalidSeries { .. } => 4,
            StockscopeError::NoData { .. }
            | StockscopeError::EmptySeries { .. }
            | StockscopeError::NoCommonDates { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
