//! User configuration document (`config.json`).
//!
//! Read once at startup, handed to the controller, written back whenever a
//! remembered selection changes. Sections this crate does not know about are
//! carried through untouched.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::chart::{CHART, TimeframeFallback};
use super::persistence::PERSISTENCE;
#[cfg(debug_assertions)]
use crate::config::debug::PRINT_CONFIG_SERDE;
use crate::domain::Timeframe;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    pub version: String,
    pub data_path: String,
    pub data_filename: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_path: PERSISTENCE.data.directory.to_string(),
            data_filename: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChartPreferences {
    /// Show the intraday pane next to the daily one
    pub use_intraday_tf: bool,
    pub show_session_shading: bool,
    pub left_timeframe: Timeframe,
    pub right_timeframe: Timeframe,
    pub timeframe_fallback: TimeframeFallback,
    /// Let a measurement start in one pane and finish in the other
    pub allow_cross_pane_measurement: bool,
}

impl Default for ChartPreferences {
    fn default() -> Self {
        Self {
            use_intraday_tf: true,
            show_session_shading: true,
            left_timeframe: CHART.left_timeframe,
            right_timeframe: CHART.right_timeframe,
            timeframe_fallback: TimeframeFallback::default(),
            allow_cross_pane_measurement: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IndicatorSpec {
    pub name: String,
    #[serde(default)]
    pub parameters: Option<BTreeMap<String, serde_json::Value>>,
}

impl IndicatorSpec {
    pub fn sma(period: usize) -> Self {
        let mut parameters = BTreeMap::new();
        parameters.insert("period".to_string(), serde_json::Value::from(period));
        Self {
            name: "SMA".to_string(),
            parameters: Some(parameters),
        }
    }

    /// Period of an SMA spec; `None` for other indicators or a missing/zero period.
    pub fn sma_period(&self) -> Option<usize> {
        if !self.name.eq_ignore_ascii_case("SMA") {
            return None;
        }
        self.parameters
            .as_ref()?
            .get("period")?
            .as_u64()
            .filter(|p| *p > 0)
            .map(|p| p as usize)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExportPreferences {
    pub screenshot_dir: String,
}

impl Default for ExportPreferences {
    fn default() -> Self {
        Self {
            screenshot_dir: PERSISTENCE.export.screenshot_dir.to_string(),
        }
    }
}

/// Remembered selections.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct CliState {
    pub last_file: Option<String>,
    pub last_ticker: Option<String>,
    pub last_date: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub chart: ChartPreferences,
    pub indicators: Vec<IndicatorSpec>,
    pub export: ExportPreferences,
    pub cli: CliState,
    /// Sections owned by other tools (e.g. image-host credentials)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl AppConfig {
    /// Missing file means defaults; a malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .context(format!("Failed to read config: {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&text)
            .context(format!("Failed to parse config: {}", path.display()))?;

        #[cfg(debug_assertions)]
        if PRINT_CONFIG_SERDE {
            log::info!("Loaded config from {}: {:?}", path.display(), config);
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, text).context(format!("Failed to write config: {}", path.display()))
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.general.data_path)
    }

    pub fn screenshot_dir(&self) -> PathBuf {
        PathBuf::from(&self.export.screenshot_dir)
    }

    pub fn sma_periods(&self) -> Vec<usize> {
        self.indicators.iter().filter_map(IndicatorSpec::sma_period).collect()
    }

    /// Returns true when the stored selection changed.
    pub fn remember_selection(&mut self, ticker: &str, date_str: &str) -> bool {
        let same = self.cli.last_ticker.as_deref() == Some(ticker)
            && self.cli.last_date.as_deref() == Some(date_str);
        if same {
            return false;
        }
        self.cli.last_ticker = Some(ticker.to_string());
        self.cli.last_date = Some(date_str.to_string());
        true
    }

    pub fn remember_file(&mut self, filename: &str) -> bool {
        if self.cli.last_file.as_deref() == Some(filename) {
            return false;
        }
        self.cli.last_file = Some(filename.to_string());
        true
    }
}
