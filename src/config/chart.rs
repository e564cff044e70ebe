//! Chart display configuration

use serde::{Deserialize, Serialize};

use crate::domain::Timeframe;

/// What a pane shows when its timeframe is missing on a newly navigated instrument.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeframeFallback {
    /// The instrument's declared default (coarsest loaded if none declared)
    #[default]
    InstrumentDefault,
    /// The pane's startup timeframe, then the instrument default
    PaneDefault,
    /// The available timeframe closest in granularity to the requested one
    Nearest,
}

/// Regular trading session, exchange-local wall-clock (hour, minute)
pub struct SessionHours {
    pub market_open: (u32, u32),
    pub market_close: (u32, u32),
}

/// Visible window around the navigated entry date
pub struct WindowConfig {
    /// Daily charts show this many days either side of the entry date
    pub daily_half_width_days: i64,
    /// Intraday charts show the entry's session plus this many prior sessions
    pub intraday_prior_days: i64,
    /// Fraction of the visible price range added above and below
    pub price_padding_pct: f64,
}

/// The Master Chart Configuration
pub struct ChartConfig {
    pub left_timeframe: Timeframe,
    pub right_timeframe: Timeframe,
    pub session: SessionHours,
    pub window: WindowConfig,
}

pub const CHART: ChartConfig = ChartConfig {
    left_timeframe: Timeframe::Day1,
    right_timeframe: Timeframe::Min1,

    session: SessionHours {
        market_open: (9, 30),
        market_close: (16, 0),
    },

    window: WindowConfig {
        daily_half_width_days: 30,
        intraday_prior_days: 0,
        price_padding_pct: 0.05,
    },
};
