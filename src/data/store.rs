use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use strum::IntoEnumIterator;

use crate::data::resample::resample;
use crate::domain::{Bar, InstrumentRecord, Timeframe};
use crate::error::{ChartError, ChartResult};
use crate::utils::time_utils::format_date;

/// One navigable chart: an instrument on a session date.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChartEntry {
    pub ticker: String,
    pub date: NaiveDate,
}

impl ChartEntry {
    pub fn new(ticker: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartMetadata {
    pub ticker: String,
    pub date: NaiveDate,
    pub date_str: String,
    pub index: usize,
}

/// Single owner of all bar data. Read-only once built; panes and the
/// measurement engine refer into it by ticker and timestamp.
#[derive(Debug, Default, Clone)]
pub struct TimeSeriesStore {
    name: String,
    entries: Vec<ChartEntry>,
    instruments: HashMap<String, InstrumentRecord>,
}

impl TimeSeriesStore {
    /// `entries` keep the order given; every entry ticker must have a record.
    pub fn new(
        name: impl Into<String>,
        instruments: Vec<InstrumentRecord>,
        entries: Vec<ChartEntry>,
    ) -> ChartResult<Self> {
        let mut by_ticker = HashMap::with_capacity(instruments.len());
        for record in instruments {
            let ticker = record.ticker.clone();
            if by_ticker.insert(ticker.clone(), record).is_some() {
                return Err(ChartError::InvalidData(format!(
                    "duplicate instrument record for {}",
                    ticker
                )));
            }
        }
        if let Some(orphan) = entries.iter().find(|e| !by_ticker.contains_key(&e.ticker)) {
            return Err(ChartError::InvalidData(format!(
                "entry {} {} has no instrument record",
                orphan.ticker, orphan.date
            )));
        }
        if let Some(empty) = entries
            .iter()
            .find(|e| by_ticker.get(&e.ticker).is_some_and(|r| !r.has_bars()))
        {
            return Err(ChartError::InvalidData(format!(
                "entry {} {} has no bars loaded",
                empty.ticker, empty.date
            )));
        }
        Ok(Self {
            name: name.into(),
            entries,
            instruments: by_ticker,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of navigable entries.
    pub fn instrument_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ChartEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> ChartResult<&ChartEntry> {
        self.entries.get(index).ok_or(ChartError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    pub fn get_metadata(&self, index: usize) -> ChartResult<ChartMetadata> {
        let entry = self.entry(index)?;
        Ok(ChartMetadata {
            ticker: entry.ticker.clone(),
            date: entry.date,
            date_str: format_date(entry.date),
            index,
        })
    }

    /// First entry matching ticker and date.
    pub fn position_of(&self, ticker: &str, date: NaiveDate) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.ticker == ticker && e.date == date)
    }

    pub fn contains_ticker(&self, ticker: &str) -> bool {
        self.instruments.contains_key(ticker)
    }

    pub fn instrument(&self, ticker: &str) -> ChartResult<&InstrumentRecord> {
        self.instruments
            .get(ticker)
            .ok_or_else(|| ChartError::UnknownTicker(ticker.to_string()))
    }

    /// Loaded timeframes plus every coarser one derivable from the finest series.
    pub fn available_timeframes(&self, ticker: &str) -> ChartResult<Vec<Timeframe>> {
        let record = self.instrument(ticker)?;
        let Some(finest) = record.finest_loaded() else {
            return Ok(Vec::new());
        };
        let mut available: Vec<Timeframe> = record.loaded_timeframes().collect();
        available.extend(
            Timeframe::iter().filter(|tf| finest.is_finer_than(*tf) && !record.bars.contains_key(tf)),
        );
        available.sort();
        Ok(available)
    }

    pub fn supports(&self, ticker: &str, timeframe: Timeframe) -> bool {
        self.available_timeframes(ticker)
            .map(|tfs| tfs.contains(&timeframe))
            .unwrap_or(false)
    }

    pub fn default_timeframe(&self, ticker: &str) -> ChartResult<Timeframe> {
        let record = self.instrument(ticker)?;
        record
            .default_timeframe()
            .ok_or_else(|| ChartError::InvalidData(format!("{} has no bars loaded", ticker)))
    }

    /// Bars for a ticker in a timeframe.
    ///
    /// A loaded series is borrowed as-is. A timeframe that is not loaded but is
    /// coarser than the finest loaded series is aggregated from that series.
    pub fn get_bars(&self, ticker: &str, timeframe: Timeframe) -> ChartResult<Cow<'_, [Bar]>> {
        let record = self.instrument(ticker)?;
        if let Some(bars) = record.bars.get(&timeframe) {
            return Ok(Cow::Borrowed(bars.as_slice()));
        }
        match record.finest_loaded() {
            Some(finest) if finest.is_finer_than(timeframe) => {
                Ok(Cow::Owned(resample(&record.bars[&finest], timeframe)))
            }
            _ => Err(ChartError::unknown_timeframe(
                Some(ticker),
                timeframe.to_string(),
            )),
        }
    }

    /// `get_bars` with a user-facing label ("1D", "15M", ...).
    pub fn get_bars_by_label(&self, ticker: &str, label: &str) -> ChartResult<Cow<'_, [Bar]>> {
        self.instrument(ticker)?;
        let timeframe = Timeframe::from_label(label)
            .map_err(|_| ChartError::unknown_timeframe(Some(ticker), label))?;
        self.get_bars(ticker, timeframe)
    }
}
