//! What a pane hands to its rendering collaborator.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::data::sessions::SessionSpan;
use crate::domain::{Bar, ChartPoint, PaneId, Timeframe};
use crate::engine::viewport::Viewport;
use crate::error::ChartResult;

/// Which click of a measurement a marker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerRole {
    First,
    Second,
}

/// Overlay primitives, drawn in this order after the candles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Overlay {
    SessionSpan(SessionSpan),
    IndicatorLine {
        name: String,
        points: Vec<ChartPoint>,
    },
    /// Segment between two points (trend lines, measurement connectors)
    Line {
        from: ChartPoint,
        to: ChartPoint,
    },
    HorizontalLine {
        price: f64,
    },
    Ray {
        origin: ChartPoint,
    },
    Marker {
        at: ChartPoint,
        role: MarkerRole,
    },
    Label {
        at: ChartPoint,
        text: String,
    },
}

/// A consistent snapshot of one pane: everything needed to draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaneFrame {
    pub pane: PaneId,
    pub ticker: String,
    pub date_str: String,
    pub timeframe: Timeframe,
    /// "TICKER TF DATE"
    pub watermark: String,
    /// Bars inside the viewport only
    pub bars: Vec<Bar>,
    #[serde(skip)]
    pub viewport: Viewport,
    pub overlays: Vec<Overlay>,
}

impl PaneFrame {
    pub fn watermark_text(ticker: &str, timeframe: Timeframe, date_str: &str) -> String {
        format!("{} {} {}", ticker, timeframe, date_str)
    }

    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.viewport.time_range
    }
}

/// The external charting widget behind one pane.
pub trait RenderSurface: Send {
    /// Replace whatever the surface shows with `frame`.
    fn draw(&mut self, frame: &PaneFrame) -> ChartResult<()>;

    /// Raster (or vector) capture of the last drawn frame.
    /// A surface that has drawn nothing returns `RenderUnavailable`.
    fn screenshot(&self) -> ChartResult<Vec<u8>>;

    /// File extension of `screenshot` output, without the dot.
    fn extension(&self) -> &'static str;
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::error::ChartError;
    use std::sync::{Arc, Mutex};

    /// Records frames; screenshots are the watermark bytes.
    #[derive(Default, Clone)]
    pub struct RecordingSurface {
        pub frames: Arc<Mutex<Vec<PaneFrame>>>,
        pub refuse: bool,
    }

    impl RecordingSurface {
        pub fn last_frame(&self) -> Option<PaneFrame> {
            self.frames.lock().unwrap().last().cloned()
        }
    }

    impl RenderSurface for RecordingSurface {
        fn draw(&mut self, frame: &PaneFrame) -> ChartResult<()> {
            self.frames.lock().unwrap().push(frame.clone());
            Ok(())
        }

        fn screenshot(&self) -> ChartResult<Vec<u8>> {
            match self.last_frame() {
                Some(frame) if !self.refuse => Ok(frame.watermark.into_bytes()),
                Some(frame) => Err(ChartError::RenderUnavailable {
                    pane: frame.pane,
                    reason: "surface refused".to_string(),
                }),
                None => Ok(Vec::new()),
            }
        }

        fn extension(&self) -> &'static str {
            "txt"
        }
    }
}
