//! Indicator and summary parameters.

pub const DEFAULT_MA_WINDOWS: (usize, usize) = (20, 50);
pub const DEFAULT_BB_WINDOW: usize = 20;
pub const DEFAULT_BB_STD: f64 = 2.0;
pub const DEFAULT_VOLATILITY_WINDOW: usize = 20;
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    /// (short, long) moving average windows.
    pub ma_windows: (usize, usize),
    pub bb_window: usize,
    pub bb_std: f64,
    pub volatility_window: usize,
    /// Annualization factor is `sqrt(periods_per_year)`.
    pub periods_per_year: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ma_windows: DEFAULT_MA_WINDOWS,
            bb_window: DEFAULT_BB_WINDOW,
            bb_std: DEFAULT_BB_STD,
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl IndicatorConfig {
    pub fn short_ma(&self) -> usize {
        self.ma_windows.0
    }

    pub fn long_ma(&self) -> usize {
        self.ma_windows.1
    }
}
