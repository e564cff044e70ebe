#![allow(clippy::collapsible_if)]

// Core modules
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod input;
pub mod render;
pub mod utils;

// The synchronization and measurement engine
pub mod engine;

// Re-export commonly used types
pub use data::{ChartEntry, Dataset, TimeSeriesStore};
pub use domain::{Bar, InstrumentRecord, PaneId, Timeframe};
pub use engine::{DualChartController, MeasurementEngine};
pub use error::{ChartError, ChartResult};

use std::path::PathBuf;
use std::sync::Arc;

// CLI argument parsing
use clap::Parser;

use crate::config::{AppConfig, PERSISTENCE};
use crate::render::SvgSurface;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// User configuration file
    #[arg(long, default_value = PERSISTENCE.config_path)]
    pub config: PathBuf,

    /// Dataset to open instead of the remembered one
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Try the binary cache before the JSON dataset
    #[arg(long, default_value_t = false)]
    pub prefer_cache: bool,

    /// Start with the left chart maximized
    #[arg(long, default_value_t = false)]
    pub single: bool,
}

/// Build the controller with headless SVG panes.
/// This is the public API for the binary to call
pub fn run_app(
    store: TimeSeriesStore,
    config: AppConfig,
    single: bool,
) -> ChartResult<DualChartController> {
    let mut controller = DualChartController::new(
        Arc::new(store),
        config,
        Box::new(SvgSurface::new(PaneId::Left)),
        Box::new(SvgSurface::new(PaneId::Right)),
    )?;
    if single {
        controller.maximize(PaneId::Left);
    }
    Ok(controller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::three_tickers;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["dual-charts"]);
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert_eq!(cli.data, None);
        assert!(!cli.prefer_cache && !cli.single);

        let cli = Cli::parse_from(["dual-charts", "--single", "--data", "data/gappers.json"]);
        assert!(cli.single);
        assert_eq!(cli.data, Some(PathBuf::from("data/gappers.json")));
    }

    #[test]
    fn single_mode_maximizes_the_left_chart() {
        let controller = run_app(three_tickers(), AppConfig::default(), true).unwrap();
        assert_eq!(controller.layout().maximized(), Some(PaneId::Left));
        assert_eq!(controller.export_screenshots().unwrap().len(), 2);
    }
}
