use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::data::store::{ChartEntry, TimeSeriesStore};
use crate::domain::InstrumentRecord;
use crate::error::{ChartError, ChartResult};

/// On-disk dataset: the navigation list plus every instrument's bars.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub name: String,
    /// Charts to step through. Derived from instrument sessions when empty.
    #[serde(default)]
    pub entries: Vec<ChartEntry>,
    pub instruments: Vec<InstrumentRecord>,
}

impl Dataset {
    /// Bar invariants for every instrument, checked in parallel.
    /// Reports the first offending instrument in dataset order.
    pub fn validate(&self) -> ChartResult<()> {
        let problems: Vec<String> = self
            .instruments
            .par_iter()
            .filter_map(|record| record.check().err())
            .collect();
        match problems.into_iter().next() {
            Some(problem) => Err(ChartError::InvalidData(problem)),
            None => Ok(()),
        }
    }

    /// Declared (or derived) entries without duplicates, newest date first,
    /// ticker ascending within a date. Instruments without bars are skipped.
    pub fn navigation_entries(&self) -> Vec<ChartEntry> {
        let entries: Vec<ChartEntry> = if self.entries.is_empty() {
            self.instruments
                .iter()
                .flat_map(|record| {
                    record
                        .sessions()
                        .into_iter()
                        .map(|date| ChartEntry::new(record.ticker.clone(), date))
                })
                .collect()
        } else {
            self.entries.clone()
        };

        let empty: HashSet<&str> = self
            .instruments
            .iter()
            .filter(|record| !record.has_bars())
            .map(|record| record.ticker.as_str())
            .collect();

        entries
            .into_iter()
            .filter(|entry| {
                let keep = !empty.contains(entry.ticker.as_str());
                if !keep {
                    log::warn!("Skipping {} {}: no bars loaded", entry.ticker, entry.date);
                }
                keep
            })
            .unique()
            .sorted_by(|a, b| b.date.cmp(&a.date).then_with(|| a.ticker.cmp(&b.ticker)))
            .collect()
    }

    pub fn into_store(self) -> ChartResult<TimeSeriesStore> {
        self.validate()?;
        let entries = self.navigation_entries();
        if entries.is_empty() {
            return Err(ChartError::InvalidData(format!(
                "dataset '{}' has nothing to chart",
                self.name
            )));
        }
        log::info!(
            "Dataset '{}': {} instruments, {} charts",
            self.name,
            self.instruments.len(),
            entries.len()
        );
        TimeSeriesStore::new(self.name, self.instruments, entries)
    }
}
