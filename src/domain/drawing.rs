//! Toolbox annotations a user places on a pane.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A position in chart coordinates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

impl ChartPoint {
    pub fn new(timestamp: NaiveDateTime, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Available drawing tools.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::EnumIter,
    strum_macros::Display,
)]
pub enum DrawingTool {
    #[strum(to_string = "Trend")]
    Trend,
    #[strum(to_string = "Horizontal")]
    Horizontal,
    #[strum(to_string = "Ray")]
    Ray,
}

impl DrawingTool {
    /// Number of clicks needed to place a drawing with this tool.
    pub fn anchors_needed(&self) -> usize {
        match self {
            DrawingTool::Trend => 2,
            DrawingTool::Horizontal | DrawingTool::Ray => 1,
        }
    }
}

/// Unique identifier for a drawing within one pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawingId(pub u64);

/// A placed drawing, each kind carrying its own parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Drawing {
    /// Segment between two points.
    Trend { start: ChartPoint, end: ChartPoint },
    /// Full-width line at a price.
    Horizontal { price: f64 },
    /// Horizontal ray from a point to the right edge.
    Ray { origin: ChartPoint },
}

impl Drawing {
    pub fn tool(&self) -> DrawingTool {
        match self {
            Drawing::Trend { .. } => DrawingTool::Trend,
            Drawing::Horizontal { .. } => DrawingTool::Horizontal,
            Drawing::Ray { .. } => DrawingTool::Ray,
        }
    }
}

/// A drawing attached to the instrument it was drawn on.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlacedDrawing {
    pub id: DrawingId,
    pub ticker: String,
    pub drawing: Drawing,
}
