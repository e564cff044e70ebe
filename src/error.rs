use std::fmt;

use crate::domain::PaneId;

/// Error types for chart operations.
///
/// Everything here is local and recoverable: the UI layer reports the message
/// and the user retries the action.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartError {
    /// A navigation entry index outside `0..len`
    IndexOutOfRange { index: usize, len: usize },
    /// The ticker is not in the store
    UnknownTicker(String),
    /// The timeframe label is not supported (or not available for this ticker)
    UnknownTimeframe { ticker: Option<String>, label: String },
    /// A measurement query that needs a state the engine is not in
    InvalidMeasurementState(String),
    /// The pane has nothing rendered yet (or the renderer refused)
    RenderUnavailable { pane: PaneId, reason: String },
    /// Loaded data breaks the bar/entry invariants
    InvalidData(String),
    /// Persisting or uploading an exported image failed
    Export { pane: Option<PaneId>, cause: String },
}

impl ChartError {
    pub fn unknown_timeframe(ticker: Option<&str>, label: impl Into<String>) -> Self {
        ChartError::UnknownTimeframe {
            ticker: ticker.map(str::to_string),
            label: label.into(),
        }
    }
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::IndexOutOfRange { index, len } => {
                write!(f, "Index {} out of range (0..{})", index, len)
            }
            ChartError::UnknownTicker(ticker) => write!(f, "Unknown ticker: {}", ticker),
            ChartError::UnknownTimeframe {
                ticker: Some(ticker),
                label,
            } => write!(f, "Timeframe {} is not available for {}", label, ticker),
            ChartError::UnknownTimeframe {
                ticker: None,
                label,
            } => write!(f, "Unknown timeframe: {}", label),
            ChartError::InvalidMeasurementState(msg) => {
                write!(f, "Invalid measurement state: {}", msg)
            }
            ChartError::RenderUnavailable { pane, reason } => {
                write!(f, "{} is not ready for capture: {}", pane, reason)
            }
            ChartError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
            ChartError::Export {
                pane: Some(pane),
                cause,
            } => write!(f, "Export failed for {}: {}", pane, cause),
            ChartError::Export { pane: None, cause } => write!(f, "Export failed: {}", cause),
        }
    }
}

impl std::error::Error for ChartError {}

pub type ChartResult<T> = Result<T, ChartError>;
