use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::bar::Bar;
use super::timeframe::Timeframe;

/// A ticker's full multi-timeframe dataset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InstrumentRecord {
    pub ticker: String,
    /// Session dates this instrument is charted on. Derived from the bars when empty.
    #[serde(default)]
    pub session_dates: Vec<NaiveDate>,
    /// Timeframe panes fall back to when theirs is unavailable. Coarsest loaded when unset.
    #[serde(default)]
    pub default_timeframe: Option<Timeframe>,
    pub bars: BTreeMap<Timeframe, Vec<Bar>>,
}

impl InstrumentRecord {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            session_dates: Vec::new(),
            default_timeframe: None,
            bars: BTreeMap::new(),
        }
    }

    pub fn with_bars(mut self, timeframe: Timeframe, bars: Vec<Bar>) -> Self {
        self.bars.insert(timeframe, bars);
        self
    }

    pub fn loaded_timeframes(&self) -> impl Iterator<Item = Timeframe> + '_ {
        self.bars.keys().copied()
    }

    /// Most granular loaded timeframe, the source for resampling.
    pub fn finest_loaded(&self) -> Option<Timeframe> {
        self.bars.keys().next_back().copied()
    }

    pub fn default_timeframe(&self) -> Option<Timeframe> {
        self.default_timeframe
            .or_else(|| self.bars.keys().next().copied())
    }

    /// True when at least one series holds a bar.
    pub fn has_bars(&self) -> bool {
        self.bars.values().any(|bars| !bars.is_empty())
    }

    /// Declared session dates, or the distinct dates of the finest series.
    pub fn sessions(&self) -> Vec<NaiveDate> {
        if !self.session_dates.is_empty() {
            return self.session_dates.clone();
        }
        self.finest_loaded()
            .and_then(|tf| self.bars.get(&tf))
            .map(|bars| bars.iter().map(|b| b.timestamp.date()).dedup().collect())
            .unwrap_or_default()
    }

    /// Every loaded series must be strictly increasing and every bar well-formed.
    pub fn check(&self) -> Result<(), String> {
        for (timeframe, bars) in &self.bars {
            for bar in bars {
                bar.check()
                    .map_err(|e| format!("{} {}: {}", self.ticker, timeframe, e))?;
            }
            if let Some((a, b)) = bars
                .iter()
                .tuple_windows()
                .find(|(a, b): &(&Bar, &Bar)| a.timestamp >= b.timestamp)
            {
                return Err(format!(
                    "{} {}: timestamps not strictly increasing ({} then {})",
                    self.ticker, timeframe, a.timestamp, b.timestamp
                ));
            }
        }
        if let Some(default) = self.default_timeframe {
            if !self.bars.keys().any(|tf| *tf == default || tf.is_finer_than(default)) {
                return Err(format!(
                    "{}: default timeframe {} is neither loaded nor derivable",
                    self.ticker, default
                ));
            }
        }
        Ok(())
    }
}
