//! Ticker universe parsing.
//!
//! Parses the comma-separated ticker list given with `--tickers`.

use std::collections::HashSet;

/// Correlation needs at least one pair.
pub const MIN_TICKERS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),

    #[error("at least {MIN_TICKERS} tickers are required to analyze correlations, got {0}")]
    TooFewTickers(usize),
}

/// Split on commas, trim, uppercase; blank tokens are skipped.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            continue;
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    if tickers.len() < MIN_TICKERS {
        return Err(UniverseError::TooFewTickers(tickers.len()));
    }
    Ok(tickers)
}
