//! Per-pane drawing tools and the drawings placed with them.

use crate::domain::{ChartPoint, Drawing, DrawingId, DrawingTool, PlacedDrawing};

/// Progress of the armed tool.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Placement {
    #[default]
    Idle,
    /// A trend line waiting for its second anchor.
    AwaitingEnd { ticker_slot: u64, start: ChartPoint },
}

#[derive(Debug, Default, Clone)]
pub struct Toolbox {
    armed: Option<DrawingTool>,
    placement: Placement,
    drawings: Vec<PlacedDrawing>,
    next_id: u64,
    /// Bumped whenever the pane changes ticker, so a half-placed trend cannot
    /// finish on another instrument.
    ticker_slot: u64,
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn armed(&self) -> Option<DrawingTool> {
        self.armed
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Arm a tool. Re-arming drops any half-placed drawing.
    pub fn arm(&mut self, tool: DrawingTool) {
        self.armed = Some(tool);
        self.placement = Placement::Idle;
    }

    pub fn disarm(&mut self) {
        self.armed = None;
        self.placement = Placement::Idle;
    }

    pub(crate) fn ticker_changed(&mut self) {
        self.ticker_slot += 1;
        self.placement = Placement::Idle;
    }

    /// Feed one click to the armed tool. Returns the id once a drawing is complete.
    /// The tool stays armed for the next drawing.
    pub fn place(&mut self, ticker: &str, point: ChartPoint) -> Option<DrawingId> {
        let tool = self.armed?;
        let drawing = match (tool, self.placement) {
            (DrawingTool::Trend, Placement::AwaitingEnd { ticker_slot, start })
                if ticker_slot == self.ticker_slot =>
            {
                Drawing::Trend { start, end: point }
            }
            (DrawingTool::Trend, _) => {
                self.placement = Placement::AwaitingEnd {
                    ticker_slot: self.ticker_slot,
                    start: point,
                };
                return None;
            }
            (DrawingTool::Horizontal, _) => Drawing::Horizontal { price: point.price },
            (DrawingTool::Ray, _) => Drawing::Ray { origin: point },
        };
        self.placement = Placement::Idle;

        let id = DrawingId(self.next_id);
        self.next_id += 1;
        self.drawings.push(PlacedDrawing {
            id,
            ticker: ticker.to_string(),
            drawing,
        });
        Some(id)
    }

    /// Drawings shown for `ticker`, oldest first.
    pub fn drawings_for<'a>(&'a self, ticker: &'a str) -> impl Iterator<Item = &'a PlacedDrawing> + 'a {
        self.drawings.iter().filter(move |d| d.ticker == ticker)
    }

    pub fn len(&self) -> usize {
        self.drawings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawings.is_empty()
    }

    /// Remove every drawing on `ticker` and any half-placed one.
    /// Returns how many drawings were removed.
    pub fn clear(&mut self, ticker: &str) -> usize {
        let before = self.drawings.len();
        self.drawings.retain(|d| d.ticker != ticker);
        self.placement = Placement::Idle;
        before - self.drawings.len()
    }

    /// Keep only drawings whose ticker passes `keep`.
    pub fn retain_tickers(&mut self, keep: impl Fn(&str) -> bool) {
        self.drawings.retain(|d| keep(&d.ticker));
    }
}
