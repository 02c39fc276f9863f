//! Trend classification from close and moving averages.

use crate::domain::enriched::EnrichedSeries;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Uptrend,
    Downtrend,
    Sideways,
    Unknown,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Uptrend => "uptrend",
            Trend::Downtrend => "downtrend",
            Trend::Sideways => "sideways",
            Trend::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the latest row where close and both moving averages are defined.
///
/// `Uptrend` needs `close > short > long`, `Downtrend` needs
/// `close < short < long`; anything else (ties included) is `Sideways`.
/// `Unknown` when either MA column is absent or never defined.
pub fn trend_label(enriched: &EnrichedSeries, short_ma: usize, long_ma: usize) -> Trend {
    let (Some(short), Some(long)) = (
        enriched.moving_average(short_ma),
        enriched.moving_average(long_ma),
    ) else {
        return Trend::Unknown;
    };

    let latest = enriched
        .bars()
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, bar)| Some((bar.close, short.simple(i)?, long.simple(i)?)));

    match latest {
        None => Trend::Unknown,
        Some((close, s, l)) if close > s && s > l => Trend::Uptrend,
        Some((close, s, l)) if close < s && s < l => Trend::Downtrend,
        Some(_) => Trend::Sideways,
    }
}
