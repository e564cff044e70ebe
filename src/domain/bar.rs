use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// Define the CandleType enum
#[derive(Debug, PartialEq)]
pub enum CandleType {
    Bullish,
    Bearish,
}

/// One OHLCV bar. Timestamps are exchange-local wall-clock time.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    // A constructor for convenience
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    // A method to determine the type of candle
    pub fn get_type(&self) -> CandleType {
        if self.close >= self.open {
            CandleType::Bullish
        } else {
            CandleType::Bearish
        }
    }

    // Returns the low and high of the candle body as a tuple
    pub fn body_range(&self) -> (f64, f64) {
        match self.get_type() {
            CandleType::Bullish => (self.open, self.close),
            CandleType::Bearish => (self.close, self.open),
        }
    }

    /// Checks finite prices, `low <= body <= high` and a non-negative volume.
    /// Returns a description of the first violation.
    pub fn check(&self) -> Result<(), String> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(format!("non-finite price in bar at {}", self.timestamp));
        }
        let (body_low, body_high) = self.body_range();
        if !(self.low <= body_low && body_high <= self.high) {
            return Err(format!(
                "bar at {} violates low <= open/close <= high (o={} h={} l={} c={})",
                self.timestamp, self.open, self.high, self.low, self.close
            ));
        }
        if self.volume.is_nan() || self.volume < 0.0 {
            return Err(format!("negative volume in bar at {}", self.timestamp));
        }
        Ok(())
    }
}

/// Fold consecutive bars into one: first open, last close, extreme high/low,
/// summed volume. `None` for an empty group.
pub fn merge_bars(timestamp: NaiveDateTime, bars: impl IntoIterator<Item = Bar>) -> Option<Bar> {
    bars.into_iter().fold(None, |acc: Option<Bar>, bar| {
        Some(match acc {
            None => Bar { timestamp, ..bar },
            Some(agg) => Bar {
                high: agg.high.max(bar.high),
                low: agg.low.min(bar.low),
                close: bar.close,
                volume: agg.volume + bar.volume,
                ..agg
            },
        })
    })
}
