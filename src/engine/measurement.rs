//! Two-click distance measurements.
//!
//! Points refer into the store by ticker and timestamp only. An engine holds
//! at most one measurement, pending or complete; a click after a complete
//! measurement starts a fresh one.

use chrono::NaiveDateTime;
use serde::Serialize;

#[cfg(debug_assertions)]
use crate::config::PRINT_MEASUREMENTS;
use crate::domain::{ChartPoint, PaneId};
use crate::error::{ChartError, ChartResult};
use crate::utils::time_utils::abs_days_between;
use crate::utils::{format_pct, format_price};

/// A click on a rendered pane, in chart coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementPoint {
    pub pane: PaneId,
    pub ticker: String,
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

impl MeasurementPoint {
    pub fn new(pane: PaneId, ticker: impl Into<String>, point: ChartPoint) -> Self {
        Self {
            pane,
            ticker: ticker.into(),
            timestamp: point.timestamp,
            price: point.price,
        }
    }

    pub fn chart_point(&self) -> ChartPoint {
        ChartPoint::new(self.timestamp, self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub first: MeasurementPoint,
    pub second: MeasurementPoint,
    /// |t2 - t1| in fractional days
    pub time_delta_days: f64,
    /// |p2 - p1|
    pub price_delta_abs: f64,
    /// (p2 - p1) / p1 * 100, undefined when p1 is zero
    pub price_delta_pct: Option<f64>,
}

impl Measurement {
    pub fn between(first: MeasurementPoint, second: MeasurementPoint) -> Self {
        let time_delta_days = abs_days_between(first.timestamp, second.timestamp);
        let diff = second.price - first.price;
        let price_delta_pct = if first.price == 0.0 {
            None
        } else {
            Some(diff / first.price * 100.0).filter(|pct| pct.is_finite())
        };
        Self {
            first,
            second,
            time_delta_days,
            price_delta_abs: diff.abs(),
            price_delta_pct,
        }
    }

    pub fn is_cross_pane(&self) -> bool {
        self.first.pane != self.second.pane
    }

    /// Overlay text with the three derived values.
    pub fn label(&self) -> String {
        format!(
            "Δt {:.2}d | Δp {} | {}",
            self.time_delta_days,
            format_price(self.price_delta_abs),
            format_pct(self.price_delta_pct)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum MeasurementState {
    #[default]
    Idle,
    Pending(MeasurementPoint),
    Complete(Measurement),
}

#[derive(Debug, Clone, Default)]
pub struct MeasurementEngine {
    state: MeasurementState,
}

impl MeasurementEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MeasurementState {
        &self.state
    }

    /// Start, or complete, a measurement. Returns the measurement once complete.
    pub fn register_click(&mut self, point: MeasurementPoint) -> Option<&Measurement> {
        #[cfg(debug_assertions)]
        if PRINT_MEASUREMENTS {
            log::info!(
                "Measure click on {} {}: {} @ {}",
                point.pane,
                point.ticker,
                point.timestamp,
                point.price
            );
        }

        let previous = std::mem::take(&mut self.state);
        self.state = match previous {
            MeasurementState::Pending(first) => {
                let measurement = Measurement::between(first, point);
                #[cfg(debug_assertions)]
                if PRINT_MEASUREMENTS {
                    log::info!("Measurement complete: {}", measurement.label());
                }
                MeasurementState::Complete(measurement)
            }
            MeasurementState::Idle | MeasurementState::Complete(_) => {
                MeasurementState::Pending(point)
            }
        };
        self.measurement()
    }

    /// Drop any pending or complete measurement. Returns whether anything was removed.
    pub fn clear(&mut self) -> bool {
        !matches!(std::mem::take(&mut self.state), MeasurementState::Idle)
    }

    pub fn is_active(&self) -> bool {
        self.state != MeasurementState::Idle
    }

    pub fn pending(&self) -> Option<&MeasurementPoint> {
        match &self.state {
            MeasurementState::Pending(point) => Some(point),
            _ => None,
        }
    }

    pub fn measurement(&self) -> Option<&Measurement> {
        match &self.state {
            MeasurementState::Complete(measurement) => Some(measurement),
            _ => None,
        }
    }

    /// The completed measurement, for callers that require one.
    pub fn completed(&self) -> ChartResult<&Measurement> {
        match &self.state {
            MeasurementState::Complete(measurement) => Ok(measurement),
            MeasurementState::Pending(_) => Err(ChartError::InvalidMeasurementState(
                "measurement still waiting for its second point".to_string(),
            )),
            MeasurementState::Idle => Err(ChartError::InvalidMeasurementState(
                "no measurement".to_string(),
            )),
        }
    }

    /// Remove the pending first point, leaving the engine idle.
    pub fn take_pending(&mut self) -> Option<MeasurementPoint> {
        match std::mem::take(&mut self.state) {
            MeasurementState::Pending(point) => Some(point),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Points on the engine's current measurement.
    pub fn points(&self) -> Vec<&MeasurementPoint> {
        match &self.state {
            MeasurementState::Idle => Vec::new(),
            MeasurementState::Pending(point) => vec![point],
            MeasurementState::Complete(m) => vec![&m.first, &m.second],
        }
    }

    /// Clear the measurement if any of its points is on a ticker `keep` rejects.
    /// Returns whether it was cleared.
    pub fn retain_instruments(&mut self, keep: impl Fn(&str) -> bool) -> bool {
        if self.points().iter().all(|p| keep(&p.ticker)) {
            return false;
        }
        self.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::ts;

    fn click(pane: PaneId, t: &str, price: f64) -> MeasurementPoint {
        MeasurementPoint::new(pane, "ZKIN", ChartPoint::new(ts(t), price))
    }

    #[test]
    fn one_day_five_percent() {
        let mut engine = MeasurementEngine::new();
        assert!(engine.register_click(click(PaneId::Left, "2025-05-08T10:00", 100.0)).is_none());
        assert!(engine.pending().is_some());

        let m = engine
            .register_click(click(PaneId::Left, "2025-05-09T10:00", 105.0))
            .cloned()
            .unwrap();
        assert_eq!(m.time_delta_days, 1.0);
        assert_eq!(m.price_delta_abs, 5.0);
        assert_eq!(m.price_delta_pct, Some(5.0));
        assert_eq!(m.label(), "Δt 1.00d | Δp 5.0000 | +5.00%");
    }

    #[test]
    fn pct_keeps_sign_and_first_point_basis() {
        let pairs = [(100.0, 90.0), (40.0, 50.0), (-20.0, -10.0), (3.5, 3.5)];
        for (p1, p2) in pairs {
            let m = Measurement::between(
                click(PaneId::Left, "2025-05-08 10:00", p1),
                click(PaneId::Left, "2025-05-08 10:30", p2),
            );
            assert_eq!(m.price_delta_pct, Some((p2 - p1) / p1 * 100.0));
            assert_eq!(m.price_delta_abs, (p2 - p1).abs());
        }
    }

    #[test]
    fn zero_basis_has_no_pct() {
        let mut engine = MeasurementEngine::new();
        engine.register_click(click(PaneId::Left, "2025-05-08 10:00", 0.0));
        let m = engine
            .register_click(click(PaneId::Left, "2025-05-08 22:00", 4.0))
            .unwrap();
        assert_eq!(m.price_delta_pct, None);
        assert_eq!(m.time_delta_days, 0.5);
        assert!(m.label().ends_with("n/a"));
    }

    #[test]
    fn third_click_starts_over() {
        let mut engine = MeasurementEngine::new();
        engine.register_click(click(PaneId::Left, "2025-05-08 10:00", 1.0));
        engine.register_click(click(PaneId::Left, "2025-05-08 11:00", 2.0));
        assert!(engine.register_click(click(PaneId::Left, "2025-05-08 12:00", 3.0)).is_none());
        assert_eq!(engine.pending().unwrap().price, 3.0);
        assert!(engine.measurement().is_none());
    }

    #[test]
    fn clear_is_idempotent_from_every_state() {
        let mut engine = MeasurementEngine::new();
        assert!(!engine.clear());

        engine.register_click(click(PaneId::Left, "2025-05-08 10:00", 1.0));
        assert!(engine.clear());
        assert!(!engine.is_active());

        engine.register_click(click(PaneId::Left, "2025-05-08 10:00", 1.0));
        engine.register_click(click(PaneId::Left, "2025-05-08 11:00", 2.0));
        assert!(engine.clear());
        assert!(!engine.clear());
        assert_eq!(engine.state(), &MeasurementState::Idle);
        assert!(engine.points().is_empty());
        assert!(matches!(
            engine.completed(),
            Err(ChartError::InvalidMeasurementState(_))
        ));
    }

    #[test]
    fn points_may_come_from_different_panes() {
        let mut engine = MeasurementEngine::new();
        engine.register_click(click(PaneId::Left, "2025-05-08 10:00", 10.0));
        let m = engine
            .register_click(click(PaneId::Right, "2025-05-08 10:30", 11.0))
            .unwrap();
        assert!(m.is_cross_pane());
    }

    #[test]
    fn take_pending_leaves_complete_measurements_alone() {
        let mut engine = MeasurementEngine::new();
        engine.register_click(click(PaneId::Left, "2025-05-08 10:00", 10.0));
        assert!(engine.take_pending().is_some());
        assert!(!engine.is_active());

        engine.register_click(click(PaneId::Left, "2025-05-08 10:00", 10.0));
        engine.register_click(click(PaneId::Left, "2025-05-08 11:00", 10.0));
        assert!(engine.take_pending().is_none());
        assert!(engine.completed().is_ok());
    }

    #[test]
    fn removed_instruments_clear_the_measurement() {
        let mut engine = MeasurementEngine::new();
        engine.register_click(click(PaneId::Left, "2025-05-08 10:00", 10.0));
        assert!(!engine.retain_instruments(|t| t == "ZKIN"));
        assert!(engine.retain_instruments(|t| t != "ZKIN"));
        assert!(!engine.is_active());
    }
}
