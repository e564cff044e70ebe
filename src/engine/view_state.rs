//! State of one chart pane.
//!
//! A pane never owns the navigation index. The controller passes the index in
//! on every refresh, and the pane keeps only what it derives from it: the
//! entry it shows, its resolved timeframe and its viewport.

use crate::config::TimeframeFallback;
use crate::data::store::{ChartEntry, TimeSeriesStore};
use crate::domain::{PaneId, Timeframe};
use crate::engine::toolbox::Toolbox;
use crate::engine::viewport::Viewport;
use crate::error::{ChartError, ChartResult};

/// A pane asking the controller to move the shared index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavRequest {
    pub pane: PaneId,
    pub delta: i64,
}

/// Everything a refresh derives, computed before anything is committed.
#[derive(Debug, Clone, PartialEq)]
struct Resolved {
    entry: ChartEntry,
    timeframe: Timeframe,
    viewport: Viewport,
}

/// Timeframe a pane shows for `ticker`: the requested one when available,
/// otherwise whatever `policy` picks.
pub fn resolve_timeframe(
    store: &TimeSeriesStore,
    ticker: &str,
    requested: Timeframe,
    pane_default: Timeframe,
    policy: TimeframeFallback,
) -> ChartResult<Timeframe> {
    let available = store.available_timeframes(ticker)?;
    if available.contains(&requested) {
        return Ok(requested);
    }
    match policy {
        TimeframeFallback::InstrumentDefault => store.default_timeframe(ticker),
        TimeframeFallback::PaneDefault if available.contains(&pane_default) => Ok(pane_default),
        TimeframeFallback::PaneDefault => store.default_timeframe(ticker),
        // Ties go to the coarser timeframe.
        TimeframeFallback::Nearest => available
            .iter()
            .copied()
            .min_by_key(|tf| (tf.minutes() - requested.minutes()).abs())
            .ok_or_else(|| ChartError::InvalidData(format!("{} has no bars loaded", ticker))),
    }
}

#[derive(Debug, Clone)]
pub struct ChartViewState {
    pane: PaneId,
    /// Startup timeframe, used by the pane-default fallback
    pane_default: Timeframe,
    /// Last timeframe the user picked; restored when the instrument allows it
    requested: Timeframe,
    resolved: Option<Resolved>,
    pub toolbox: Toolbox,
}

impl ChartViewState {
    pub fn new(pane: PaneId, timeframe: Timeframe) -> Self {
        Self {
            pane,
            pane_default: timeframe,
            requested: timeframe,
            resolved: None,
            toolbox: Toolbox::new(),
        }
    }

    pub fn pane(&self) -> PaneId {
        self.pane
    }

    /// Timeframe on screen, or the requested one before the first refresh.
    pub fn timeframe(&self) -> Timeframe {
        self.resolved
            .as_ref()
            .map(|r| r.timeframe)
            .unwrap_or(self.requested)
    }

    pub fn requested_timeframe(&self) -> Timeframe {
        self.requested
    }

    /// True when the pane shows a fallback instead of its requested timeframe.
    pub fn is_fallback(&self) -> bool {
        self.timeframe() != self.requested
    }

    pub fn entry(&self) -> Option<&ChartEntry> {
        self.resolved.as_ref().map(|r| &r.entry)
    }

    pub fn ticker(&self) -> Option<&str> {
        self.entry().map(|e| e.ticker.as_str())
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.resolved.as_ref().map(|r| &r.viewport)
    }

    /// Ask the controller to move the shared index.
    pub fn advance(&self, delta: i64) -> NavRequest {
        NavRequest {
            pane: self.pane,
            delta,
        }
    }

    fn resolve(
        &self,
        store: &TimeSeriesStore,
        index: usize,
        timeframe: Timeframe,
    ) -> ChartResult<Resolved> {
        let entry = store.entry(index)?.clone();
        let bars = store.get_bars(&entry.ticker, timeframe)?;
        let viewport = Viewport::compute(&bars, timeframe, entry.date);
        Ok(Resolved {
            entry,
            timeframe,
            viewport,
        })
    }

    /// Recompute the pane for `index`. Nothing changes when it fails.
    pub fn refresh(
        &mut self,
        store: &TimeSeriesStore,
        index: usize,
        policy: TimeframeFallback,
    ) -> ChartResult<()> {
        let resolved = self.prepare(store, index, policy)?;
        self.commit(resolved);
        Ok(())
    }

    fn prepare(
        &self,
        store: &TimeSeriesStore,
        index: usize,
        policy: TimeframeFallback,
    ) -> ChartResult<Resolved> {
        let ticker = &store.entry(index)?.ticker;
        let timeframe =
            resolve_timeframe(store, ticker, self.requested, self.pane_default, policy)?;
        self.resolve(store, index, timeframe)
    }

    fn commit(&mut self, resolved: Resolved) {
        if self.ticker() != Some(resolved.entry.ticker.as_str()) {
            self.toolbox.ticker_changed();
        }
        self.resolved = Some(resolved);
    }

    /// Switch this pane's timeframe for the entry at `index`.
    /// An unknown or unavailable label leaves the pane untouched.
    pub fn set_timeframe(
        &mut self,
        store: &TimeSeriesStore,
        index: usize,
        label: &str,
    ) -> ChartResult<Timeframe> {
        let ticker = store.entry(index)?.ticker.clone();
        let timeframe = Timeframe::from_label(label)
            .map_err(|_| ChartError::unknown_timeframe(Some(&ticker), label))?;
        if !store.supports(&ticker, timeframe) {
            return Err(ChartError::unknown_timeframe(Some(&ticker), label));
        }
        let resolved = self.resolve(store, index, timeframe)?;
        self.requested = timeframe;
        self.commit(resolved);
        Ok(timeframe)
    }
}

/// Both panes refreshed together, or neither.
pub(crate) fn refresh_all(
    panes: &mut [ChartViewState],
    store: &TimeSeriesStore,
    index: usize,
    policy: TimeframeFallback,
) -> ChartResult<()> {
    let prepared = panes
        .iter()
        .map(|pane| pane.prepare(store, index, policy))
        .collect::<ChartResult<Vec<_>>>()?;
    for (pane, resolved) in panes.iter_mut().zip(prepared) {
        pane.commit(resolved);
    }
    Ok(())
}
