// Domain types and value objects
pub mod bar;
pub mod drawing;
pub mod instrument;
pub mod pane;
pub mod timeframe;

// Re-export commonly used types
pub use bar::Bar;
pub use drawing::{ChartPoint, Drawing, DrawingId, DrawingTool, PlacedDrawing};
pub use instrument::InstrumentRecord;
pub use pane::PaneId;
pub use timeframe::Timeframe;
