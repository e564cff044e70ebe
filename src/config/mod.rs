//! Configuration module for the dual chart application.

pub mod chart;
pub mod persistence;
pub mod plot;
pub mod user;

mod debug; // Private: use the re-exports below
pub use debug::{PRINT_CONFIG_SERDE, PRINT_EXPORT, PRINT_MEASUREMENTS, PRINT_NAVIGATION, PRINT_SERDE};

// Re-export commonly used items
pub use chart::{CHART, TimeframeFallback};
pub use persistence::{PERSISTENCE, dataset_cache_filename, default_cache_path};
pub use plot::PLOT_CONFIG;
pub use user::{AppConfig, ChartPreferences, CliState, IndicatorSpec};
