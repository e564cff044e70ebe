//! Visible window of a pane and the mapping between pane and chart coordinates.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::ops::Range;

use crate::config::CHART;
use crate::domain::{Bar, ChartPoint, Timeframe};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Viewport {
    /// Indices into the displayed series
    pub bars: Range<usize>,
    /// First and last bar timestamp of the window
    pub time_range: Option<(NaiveDateTime, NaiveDateTime)>,
    /// (low, high) of the window, padded
    pub price_range: Option<(f64, f64)>,
}

/// Session dates a pane shows around the navigated date.
pub fn window_dates(timeframe: Timeframe, date: NaiveDate) -> (NaiveDate, NaiveDate) {
    if timeframe.is_intraday() {
        let prior = TimeDelta::days(CHART.window.intraday_prior_days);
        (date - prior, date)
    } else {
        let half = TimeDelta::days(CHART.window.daily_half_width_days);
        (date - half, date + half)
    }
}

impl Viewport {
    /// Computed from scratch for `bars` (strictly increasing) around `date`.
    pub fn compute(bars: &[Bar], timeframe: Timeframe, date: NaiveDate) -> Self {
        let (first_date, last_date) = window_dates(timeframe, date);
        let start = bars.partition_point(|b| b.timestamp.date() < first_date);
        let end = bars.partition_point(|b| b.timestamp.date() <= last_date);
        let window = &bars[start..end];

        let (Some(first), Some(last)) = (window.first(), window.last()) else {
            return Self {
                bars: start..start,
                ..Self::default()
            };
        };

        let low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let span = high - low;
        let pad = if span > 0.0 {
            span * CHART.window.price_padding_pct
        } else {
            high.abs().max(1.0) * CHART.window.price_padding_pct
        };

        Self {
            bars: start..end,
            time_range: Some((first.timestamp, last.timestamp)),
            price_range: Some((low - pad, high + pad)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Chart coordinates under a pane position.
    /// `x_frac` runs left to right, `y_frac` top to bottom, both clamped to 0..=1.
    pub fn point_at(&self, x_frac: f64, y_frac: f64) -> Option<ChartPoint> {
        let (start, end) = self.time_range?;
        let (low, high) = self.price_range?;
        let x = x_frac.clamp(0.0, 1.0);
        let y = y_frac.clamp(0.0, 1.0);

        let span_ms = (end - start).num_milliseconds() as f64;
        let timestamp = start + TimeDelta::milliseconds((span_ms * x).round() as i64);
        let price = high - (high - low) * y;
        Some(ChartPoint::new(timestamp, price))
    }

    /// Inverse of `point_at`. Points outside the window map outside 0..=1.
    pub fn position_of(&self, point: &ChartPoint) -> Option<(f64, f64)> {
        let (start, end) = self.time_range?;
        let (low, high) = self.price_range?;

        let span_ms = (end - start).num_milliseconds() as f64;
        let x = if span_ms > 0.0 {
            (point.timestamp - start).num_milliseconds() as f64 / span_ms
        } else {
            0.0
        };
        let y = (high - point.price) / (high - low);
        Some((x, y))
    }

    pub fn slice<'a>(&self, bars: &'a [Bar]) -> &'a [Bar] {
        bars.get(self.bars.clone()).unwrap_or(&[])
    }
}
