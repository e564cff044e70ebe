pub mod controller;
pub mod export;
pub mod measurement;
pub mod render;
pub mod toolbox;
pub mod view_state;
pub mod viewport;

// Re-export key components
pub use controller::{DualChartController, Layout, NavOutcome, NavState};
pub use export::{DirectorySink, ExportImage, ExportSink, ProjectArchive};
pub use measurement::{Measurement, MeasurementEngine, MeasurementPoint};
pub use render::{Overlay, PaneFrame, RenderSurface};
pub use view_state::{ChartViewState, NavRequest};
pub use viewport::Viewport;
