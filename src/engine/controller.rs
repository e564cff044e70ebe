use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{AppConfig, CHART, TimeframeFallback};
#[cfg(debug_assertions)]
use crate::config::{PRINT_EXPORT, PRINT_NAVIGATION};
use crate::data::indicators::{sma, sma_name};
use crate::data::sessions::session_spans;
use crate::data::store::{ChartMetadata, TimeSeriesStore};
use crate::domain::{ChartPoint, Drawing, DrawingId, DrawingTool, PaneId, Timeframe};
use crate::engine::export::ExportImage;
use crate::engine::measurement::{
    Measurement, MeasurementEngine, MeasurementPoint, MeasurementState,
};
use crate::engine::render::{MarkerRole, Overlay, PaneFrame, RenderSurface};
use crate::engine::view_state::{ChartViewState, NavRequest, refresh_all};
use crate::error::{ChartError, ChartResult};
use crate::utils::TimeUtils;
use crate::utils::time_utils::format_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle,
    /// Panes are being refreshed against a new index
    Navigating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved { from: usize, to: usize },
    /// Already at the clamped target
    Unchanged,
}

/// Which pane, if any, fills the window. No effect on data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Layout {
    maximized: Option<PaneId>,
}

impl Layout {
    pub fn maximized(&self) -> Option<PaneId> {
        self.maximized
    }

    /// Returns whether the layout changed.
    pub fn maximize(&mut self, pane: PaneId) -> bool {
        let changed = self.maximized != Some(pane);
        self.maximized = Some(pane);
        changed
    }

    pub fn restore(&mut self) -> bool {
        self.maximized.take().is_some()
    }

    pub fn toggle(&mut self, pane: PaneId) -> bool {
        if self.maximized == Some(pane) {
            self.restore()
        } else {
            self.maximize(pane)
        }
    }

    pub fn is_visible(&self, pane: PaneId) -> bool {
        self.maximized.is_none_or(|m| m == pane)
    }
}

/// Owns the navigation index and both panes.
///
/// Every user action is handled synchronously. Panes are redrawn on their
/// surfaces after each change; a failed redraw is logged and the state change
/// stands.
pub struct DualChartController {
    store: Arc<TimeSeriesStore>,
    config: AppConfig,
    preferences_dirty: bool,
    index: usize,
    nav_state: NavState,
    panes: [ChartViewState; 2],
    surfaces: [Box<dyn RenderSurface>; 2],
    /// Same-pane measurements
    engines: [MeasurementEngine; 2],
    /// Measurement started in one pane and finished in the other
    cross: MeasurementEngine,
    layout: Layout,
}

impl DualChartController {
    pub fn new(
        store: Arc<TimeSeriesStore>,
        config: AppConfig,
        left: Box<dyn RenderSurface>,
        right: Box<dyn RenderSurface>,
    ) -> ChartResult<Self> {
        if store.is_empty() {
            return Err(ChartError::InvalidData(format!(
                "dataset '{}' has nothing to chart",
                store.name()
            )));
        }
        let index = last_selection(&store, &config).unwrap_or(0);
        let mut panes = [
            ChartViewState::new(PaneId::Left, config.chart.left_timeframe),
            ChartViewState::new(PaneId::Right, config.chart.right_timeframe),
        ];
        refresh_all(&mut panes, &store, index, config.chart.timeframe_fallback)?;

        let mut layout = Layout::default();
        if !config.chart.use_intraday_tf {
            layout.maximize(PaneId::Left);
        }

        let mut controller = Self {
            store,
            config,
            preferences_dirty: false,
            index,
            nav_state: NavState::Idle,
            panes,
            surfaces: [left, right],
            engines: [MeasurementEngine::new(), MeasurementEngine::new()],
            cross: MeasurementEngine::new(),
            layout,
        };
        log::info!(
            "Charting '{}' from {} of {}",
            controller.store.name(),
            index + 1,
            controller.store.instrument_count()
        );
        controller.render_all();
        Ok(controller)
    }

    // --- ACCESSORS ---

    pub fn store(&self) -> &TimeSeriesStore {
        &self.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn nav_state(&self) -> NavState {
        self.nav_state
    }

    pub fn metadata(&self) -> ChartResult<ChartMetadata> {
        self.store.get_metadata(self.index)
    }

    pub fn pane(&self, pane: PaneId) -> &ChartViewState {
        &self.panes[pane.slot()]
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn measurement(&self, pane: PaneId) -> &MeasurementEngine {
        &self.engines[pane.slot()]
    }

    pub fn cross_measurement(&self) -> &MeasurementEngine {
        &self.cross
    }

    fn fallback(&self) -> TimeframeFallback {
        self.config.chart.timeframe_fallback
    }

    // --- PREFERENCES ---

    /// True when the config has changes the host should write back.
    pub fn preferences_dirty(&self) -> bool {
        self.preferences_dirty
    }

    pub fn mark_preferences_saved(&mut self) {
        self.preferences_dirty = false;
    }

    fn remember_selection(&mut self) {
        if let Ok(meta) = self.store.get_metadata(self.index) {
            self.preferences_dirty |= self.config.remember_selection(&meta.ticker, &meta.date_str);
        }
    }

    // --- NAVIGATION ---

    /// Move the shared index by `delta`, clamped into range.
    /// Landing on the current index is a no-op.
    pub fn navigate(&mut self, delta: i64) -> ChartResult<NavOutcome> {
        let last = self.store.instrument_count().saturating_sub(1) as i64;
        let target = (self.index as i64).saturating_add(delta).clamp(0, last) as usize;
        self.move_to(target)
    }

    pub fn handle(&mut self, request: NavRequest) -> ChartResult<NavOutcome> {
        self.navigate(request.delta)
    }

    /// Jump straight to an entry.
    pub fn jump_to(&mut self, index: usize) -> ChartResult<NavOutcome> {
        self.store.entry(index)?;
        self.move_to(index)
    }

    fn move_to(&mut self, target: usize) -> ChartResult<NavOutcome> {
        let from = self.index;
        if target == from {
            #[cfg(debug_assertions)]
            if PRINT_NAVIGATION {
                log::info!("Navigation clamped at {} of {}", from + 1, self.store.instrument_count());
            }
            return Ok(NavOutcome::Unchanged);
        }

        let policy = self.fallback();
        self.nav_state = NavState::Navigating;
        let refreshed = refresh_all(&mut self.panes, &self.store, target, policy);
        self.nav_state = NavState::Idle;
        refreshed?;

        self.index = target;
        self.remember_selection();

        #[cfg(debug_assertions)]
        if PRINT_NAVIGATION {
            for pane in &self.panes {
                if pane.is_fallback() {
                    log::info!(
                        "{} shows {} ({} unavailable)",
                        pane.pane(),
                        pane.timeframe(),
                        pane.requested_timeframe()
                    );
                }
            }
            log::info!("Navigated {} -> {}", from, target);
        }

        self.render_all();
        Ok(NavOutcome::Moved { from, to: target })
    }

    /// Swap in a new dataset. The current entry is kept when present, otherwise
    /// the index is clamped. Annotations on removed tickers are dropped.
    pub fn reload(&mut self, store: Arc<TimeSeriesStore>) -> ChartResult<()> {
        if store.is_empty() {
            return Err(ChartError::InvalidData(format!(
                "dataset '{}' has nothing to chart",
                store.name()
            )));
        }
        let target = self
            .store
            .entry(self.index)
            .ok()
            .and_then(|e| store.position_of(&e.ticker, e.date))
            .unwrap_or_else(|| self.index.min(store.instrument_count() - 1));

        let policy = self.fallback();
        refresh_all(&mut self.panes, &store, target, policy)?;
        self.store = store;
        self.index = target;

        let store = &self.store;
        for pane in &mut self.panes {
            pane.toolbox.retain_tickers(|t| store.contains_ticker(t));
        }
        for engine in self.engines.iter_mut().chain(std::iter::once(&mut self.cross)) {
            engine.retain_instruments(|t| store.contains_ticker(t));
        }

        log::info!(
            "Reloaded '{}': {} charts, at {}",
            self.store.name(),
            self.store.instrument_count(),
            target + 1
        );
        self.remember_selection();
        self.render_all();
        Ok(())
    }

    // --- PANE EVENTS ---

    pub fn set_pane_timeframe(&mut self, pane: PaneId, label: &str) -> ChartResult<Timeframe> {
        let timeframe = self.panes[pane.slot()].set_timeframe(&self.store, self.index, label)?;
        self.render_pane(pane);
        Ok(timeframe)
    }

    pub fn arm_tool(&mut self, pane: PaneId, tool: DrawingTool) {
        self.panes[pane.slot()].toolbox.arm(tool);
    }

    pub fn disarm_tool(&mut self, pane: PaneId) {
        self.panes[pane.slot()].toolbox.disarm();
    }

    /// Remove this pane's drawings on the displayed ticker.
    pub fn clear_toolbox(&mut self, pane: PaneId) -> usize {
        let state = &mut self.panes[pane.slot()];
        let Some(ticker) = state.ticker().map(str::to_string) else {
            return 0;
        };
        let removed = state.toolbox.clear(&ticker);
        self.render_pane(pane);
        removed
    }

    fn point_at(&self, pane: PaneId, x_frac: f64, y_frac: f64) -> ChartResult<ChartPoint> {
        self.panes[pane.slot()]
            .viewport()
            .and_then(|v| v.point_at(x_frac, y_frac))
            .ok_or(ChartError::RenderUnavailable {
                pane,
                reason: "no bars in view".to_string(),
            })
    }

    /// Single click at a pane position: feeds the armed drawing tool.
    pub fn click(&mut self, pane: PaneId, x_frac: f64, y_frac: f64) -> ChartResult<Option<DrawingId>> {
        let point = self.point_at(pane, x_frac, y_frac)?;
        Ok(self.place_drawing(pane, point))
    }

    pub fn place_drawing(&mut self, pane: PaneId, point: ChartPoint) -> Option<DrawingId> {
        let state = &mut self.panes[pane.slot()];
        let ticker = state.ticker()?.to_string();
        let id = state.toolbox.place(&ticker, point);
        if id.is_some() {
            self.render_pane(pane);
        }
        id
    }

    /// Double click at a pane position: one measurement click.
    pub fn double_click(
        &mut self,
        pane: PaneId,
        x_frac: f64,
        y_frac: f64,
    ) -> ChartResult<Option<Measurement>> {
        let point = self.point_at(pane, x_frac, y_frac)?;
        self.measure_at(pane, point)
    }

    /// A measurement click in chart coordinates.
    ///
    /// When the other pane holds a pending first point and cross-pane
    /// measurement is allowed, that point and this one form a cross-pane
    /// measurement. Otherwise the click goes to this pane's own engine.
    pub fn measure_at(&mut self, pane: PaneId, point: ChartPoint) -> ChartResult<Option<Measurement>> {
        let ticker = self.panes[pane.slot()]
            .ticker()
            .ok_or(ChartError::RenderUnavailable {
                pane,
                reason: "pane shows no instrument".to_string(),
            })?
            .to_string();
        let click = MeasurementPoint::new(pane, ticker, point);

        let other = pane.other();
        let cross = self.config.chart.allow_cross_pane_measurement
            && self.engines[pane.slot()].pending().is_none()
            && self.engines[other.slot()].pending().is_some();

        let completed = if cross {
            match self.engines[other.slot()].take_pending() {
                Some(first) => {
                    self.cross.register_click(first);
                    self.cross.register_click(click).cloned()
                }
                None => None,
            }
        } else {
            self.engines[pane.slot()].register_click(click).cloned()
        };

        if cross {
            self.render_all();
        } else {
            self.render_pane(pane);
        }
        Ok(completed)
    }

    /// Clear this pane's measurement and any cross-pane one touching it.
    pub fn clear_measurements(&mut self, pane: PaneId) -> bool {
        let mut cleared = self.engines[pane.slot()].clear();
        if self.cross.points().iter().any(|p| p.pane == pane) {
            cleared |= self.cross.clear();
            self.render_all();
        } else {
            self.render_pane(pane);
        }
        cleared
    }

    pub fn clear_all_measurements(&mut self) -> bool {
        let mut cleared = false;
        for engine in self.engines.iter_mut().chain(std::iter::once(&mut self.cross)) {
            cleared |= engine.clear();
        }
        if cleared {
            self.render_all();
        }
        cleared
    }

    // --- LAYOUT ---

    pub fn maximize(&mut self, pane: PaneId) -> bool {
        self.layout.maximize(pane)
    }

    pub fn restore(&mut self) -> bool {
        self.layout.restore()
    }

    pub fn toggle_maximize(&mut self, pane: PaneId) -> bool {
        self.layout.toggle(pane)
    }

    // --- RENDERING ---

    /// Snapshot of everything `pane` shows right now.
    pub fn frame(&self, pane: PaneId) -> ChartResult<PaneFrame> {
        let state = &self.panes[pane.slot()];
        let (Some(entry), Some(viewport)) = (state.entry(), state.viewport()) else {
            return Err(ChartError::RenderUnavailable {
                pane,
                reason: "pane not refreshed".to_string(),
            });
        };
        let timeframe = state.timeframe();
        let series = self.store.get_bars(&entry.ticker, timeframe)?;
        let window = viewport.slice(&series);
        let date_str = format_date(entry.date);

        let mut overlays = Vec::new();

        if timeframe.is_intraday() && self.config.chart.show_session_shading {
            overlays.extend(
                session_spans(window, &CHART.session)
                    .into_iter()
                    .map(Overlay::SessionSpan),
            );
        }

        for period in self.config.sma_periods() {
            let values = sma(&series, period);
            let points: Vec<ChartPoint> = viewport
                .bars
                .clone()
                .filter_map(|i| Some(ChartPoint::new(series[i].timestamp, values[i]?)))
                .collect();
            if !points.is_empty() {
                overlays.push(Overlay::IndicatorLine {
                    name: sma_name(period),
                    points,
                });
            }
        }

        for placed in state.toolbox.drawings_for(&entry.ticker) {
            overlays.push(match placed.drawing {
                Drawing::Trend { start, end } => Overlay::Line { from: start, to: end },
                Drawing::Horizontal { price } => Overlay::HorizontalLine { price },
                Drawing::Ray { origin } => Overlay::Ray { origin },
            });
        }

        for engine in [&self.engines[pane.slot()], &self.cross] {
            overlays.extend(measurement_overlays(engine, pane, &entry.ticker));
        }

        Ok(PaneFrame {
            pane,
            ticker: entry.ticker.clone(),
            watermark: PaneFrame::watermark_text(&entry.ticker, timeframe, &date_str),
            date_str,
            timeframe,
            bars: window.to_vec(),
            viewport: viewport.clone(),
            overlays,
        })
    }

    pub fn render_pane(&mut self, pane: PaneId) {
        let drawn = self
            .frame(pane)
            .and_then(|frame| self.surfaces[pane.slot()].draw(&frame));
        if let Err(e) = drawn {
            log::warn!("Render failed for {}: {}", pane, e);
        }
    }

    pub fn render_all(&mut self) {
        for pane in [PaneId::Left, PaneId::Right] {
            self.render_pane(pane);
        }
    }

    // --- EXPORT ---

    /// Capture both panes. Either every pane yields non-empty bytes or the
    /// whole call fails with the pane that could not be captured.
    pub fn export_screenshots(&self) -> ChartResult<BTreeMap<PaneId, Vec<u8>>> {
        let mut images = BTreeMap::new();
        for pane in [PaneId::Left, PaneId::Right] {
            let bytes = self.surfaces[pane.slot()]
                .screenshot()
                .map_err(|e| match e {
                    ChartError::RenderUnavailable { .. } => e,
                    other => ChartError::RenderUnavailable {
                        pane,
                        reason: other.to_string(),
                    },
                })?;
            if bytes.is_empty() {
                return Err(ChartError::RenderUnavailable {
                    pane,
                    reason: "nothing rendered yet".to_string(),
                });
            }

            #[cfg(debug_assertions)]
            if PRINT_EXPORT {
                log::info!("Captured {}: {} bytes", pane, bytes.len());
            }
            images.insert(pane, bytes);
        }
        Ok(images)
    }

    /// `export_screenshots` paired with what each pane shows.
    pub fn export_batch(&self) -> ChartResult<Vec<ExportImage>> {
        let captures = self.export_screenshots()?;
        captures
            .into_iter()
            .map(|(pane, bytes)| {
                let state = &self.panes[pane.slot()];
                let entry = state.entry().ok_or(ChartError::RenderUnavailable {
                    pane,
                    reason: "pane not refreshed".to_string(),
                })?;
                Ok(ExportImage {
                    pane,
                    ticker: entry.ticker.clone(),
                    date_str: format_date(entry.date),
                    extension: self.surfaces[pane.slot()].extension(),
                    bytes,
                })
            })
            .collect()
    }
}

/// Index of the remembered ticker/date, if it is still in the store.
fn last_selection(store: &TimeSeriesStore, config: &AppConfig) -> Option<usize> {
    let ticker = config.cli.last_ticker.as_deref()?;
    let date =
        NaiveDate::parse_from_str(config.cli.last_date.as_deref()?, TimeUtils::STANDARD_TIME_FORMAT)
            .ok()?;
    store.position_of(ticker, date)
}

/// Markers, connector and label for the points of `engine` that sit on `pane`.
fn measurement_overlays(engine: &MeasurementEngine, pane: PaneId, ticker: &str) -> Vec<Overlay> {
    let on_pane = |p: &MeasurementPoint| p.pane == pane && p.ticker == ticker;
    let mut overlays = Vec::new();
    match engine.state() {
        MeasurementState::Idle => {}
        MeasurementState::Pending(first) => {
            if on_pane(first) {
                overlays.push(Overlay::Marker {
                    at: first.chart_point(),
                    role: MarkerRole::First,
                });
            }
        }
        MeasurementState::Complete(m) => {
            if on_pane(&m.first) {
                overlays.push(Overlay::Marker {
                    at: m.first.chart_point(),
                    role: MarkerRole::First,
                });
            }
            if on_pane(&m.second) {
                overlays.push(Overlay::Marker {
                    at: m.second.chart_point(),
                    role: MarkerRole::Second,
                });
                if on_pane(&m.first) {
                    overlays.push(Overlay::Line {
                        from: m.first.chart_point(),
                        to: m.second.chart_point(),
                    });
                }
                overlays.push(Overlay::Label {
                    at: m.second.chart_point(),
                    text: m.label(),
                });
            }
        }
    }
    overlays
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndicatorSpec;
    use crate::data::fixtures::{three_tickers, ts, zkin_store};
    use crate::engine::render::testing::RecordingSurface;

    fn controller_with(
        store: TimeSeriesStore,
        config: AppConfig,
    ) -> (DualChartController, RecordingSurface, RecordingSurface) {
        let left = RecordingSurface::default();
        let right = RecordingSurface::default();
        let controller = DualChartController::new(
            Arc::new(store),
            config,
            Box::new(left.clone()),
            Box::new(right.clone()),
        )
        .unwrap();
        (controller, left, right)
    }

    fn controller() -> DualChartController {
        controller_with(three_tickers(), AppConfig::default()).0
    }

    fn tickers(c: &DualChartController) -> (String, String) {
        (
            c.pane(PaneId::Left).ticker().unwrap().to_string(),
            c.pane(PaneId::Right).ticker().unwrap().to_string(),
        )
    }

    #[test]
    fn round_trip_restores_index_and_panes() {
        let mut c = controller();
        c.jump_to(1).unwrap();
        let before = (c.index(), tickers(&c), c.pane(PaneId::Right).timeframe());

        assert_eq!(c.navigate(1).unwrap(), NavOutcome::Moved { from: 1, to: 2 });
        assert_eq!(tickers(&c), ("CCC".to_string(), "CCC".to_string()));
        assert_eq!(c.navigate(-1).unwrap(), NavOutcome::Moved { from: 2, to: 1 });

        assert_eq!((c.index(), tickers(&c), c.pane(PaneId::Right).timeframe()), before);
        assert_eq!(c.nav_state(), NavState::Idle);
    }

    #[test]
    fn boundaries_are_no_ops() {
        let mut c = controller();
        assert_eq!(c.index(), 0);
        assert_eq!(c.navigate(-1).unwrap(), NavOutcome::Unchanged);
        assert_eq!(c.index(), 0);

        c.jump_to(2).unwrap();
        assert_eq!(c.navigate(1).unwrap(), NavOutcome::Unchanged);
        assert_eq!(c.index(), 2);
        assert_eq!(c.navigate(i64::MAX).unwrap(), NavOutcome::Unchanged);
    }

    #[test]
    fn large_step_clamps_to_last() {
        let mut c = controller();
        c.jump_to(1).unwrap();
        assert_eq!(c.navigate(5).unwrap(), NavOutcome::Moved { from: 1, to: 2 });
        assert_eq!(c.index(), 2);
        assert_eq!(c.navigate(-50).unwrap(), NavOutcome::Moved { from: 2, to: 0 });
    }

    #[test]
    fn jump_out_of_range_is_an_error() {
        let mut c = controller();
        assert_eq!(
            c.jump_to(3).unwrap_err(),
            ChartError::IndexOutOfRange { index: 3, len: 3 }
        );
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn pane_requests_go_through_the_controller() {
        let mut c = controller();
        let request = c.pane(PaneId::Right).advance(1);
        c.handle(request).unwrap();
        assert_eq!(c.index(), 1);
        assert_eq!(tickers(&c), ("BBB".to_string(), "BBB".to_string()));
    }

    #[test]
    fn timeframe_change_leaves_the_other_pane_alone() {
        let mut c = controller();
        let left_before = (c.pane(PaneId::Left).timeframe(), c.pane(PaneId::Left).viewport().cloned());

        assert_eq!(c.set_pane_timeframe(PaneId::Right, "5M").unwrap(), Timeframe::Min5);
        assert_eq!(c.pane(PaneId::Right).timeframe(), Timeframe::Min5);
        assert_eq!(
            (c.pane(PaneId::Left).timeframe(), c.pane(PaneId::Left).viewport().cloned()),
            left_before
        );
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn unsupported_timeframe_is_reported() {
        let mut c = controller();
        assert_eq!(
            c.set_pane_timeframe(PaneId::Left, "1W").unwrap_err(),
            ChartError::unknown_timeframe(Some("AAA"), "1W")
        );
        assert_eq!(c.pane(PaneId::Left).timeframe(), Timeframe::Day1);
    }

    #[test]
    fn panes_fall_back_and_recover() {
        let mut c = controller();
        c.jump_to(2).unwrap();
        assert_eq!(c.pane(PaneId::Right).timeframe(), Timeframe::Day1);
        assert!(c.pane(PaneId::Right).is_fallback());

        c.navigate(-1).unwrap();
        assert_eq!(c.pane(PaneId::Right).timeframe(), Timeframe::Min1);
    }

    #[test]
    fn measurement_scenario() {
        let mut c = controller();
        assert!(
            c.measure_at(PaneId::Left, ChartPoint::new(ts("2025-05-08T10:00"), 100.0))
                .unwrap()
                .is_none()
        );
        let m = c
            .measure_at(PaneId::Left, ChartPoint::new(ts("2025-05-09T10:00"), 105.0))
            .unwrap()
            .unwrap();
        assert_eq!(
            (m.time_delta_days, m.price_delta_abs, m.price_delta_pct),
            (1.0, 5.0, Some(5.0))
        );

        let frame = c.frame(PaneId::Left).unwrap();
        let roles: Vec<MarkerRole> = frame
            .overlays
            .iter()
            .filter_map(|o| match o {
                Overlay::Marker { role, .. } => Some(*role),
                _ => None,
            })
            .collect();
        assert_eq!(roles, vec![MarkerRole::First, MarkerRole::Second]);
        assert!(frame.overlays.iter().any(|o| matches!(o, Overlay::Line { .. })));
        assert!(frame.overlays.iter().any(|o| matches!(o, Overlay::Label { .. })));
    }

    #[test]
    fn cross_pane_measurement() {
        let mut c = controller();
        c.measure_at(PaneId::Left, ChartPoint::new(ts("2025-05-08"), 100.0))
            .unwrap();
        let m = c
            .measure_at(PaneId::Right, ChartPoint::new(ts("2025-05-08 09:30"), 103.0))
            .unwrap()
            .unwrap();
        assert!(m.is_cross_pane());
        assert!(!c.measurement(PaneId::Left).is_active());
        assert!(c.cross_measurement().measurement().is_some());

        let left = c.frame(PaneId::Left).unwrap();
        assert!(!left.overlays.iter().any(|o| matches!(o, Overlay::Line { .. })));
        let right = c.frame(PaneId::Right).unwrap();
        assert!(right.overlays.iter().any(|o| matches!(o, Overlay::Label { .. })));
    }

    #[test]
    fn cross_pane_can_be_disabled() {
        let mut config = AppConfig::default();
        config.chart.allow_cross_pane_measurement = false;
        let (mut c, _, _) = controller_with(three_tickers(), config);
        c.measure_at(PaneId::Left, ChartPoint::new(ts("2025-05-08"), 100.0))
            .unwrap();
        assert!(
            c.measure_at(PaneId::Right, ChartPoint::new(ts("2025-05-08 09:30"), 103.0))
                .unwrap()
                .is_none()
        );
        assert!(c.measurement(PaneId::Left).pending().is_some());
        assert!(c.measurement(PaneId::Right).pending().is_some());
    }

    #[test]
    fn clear_all_measurements_is_idempotent() {
        let mut c = controller();
        c.measure_at(PaneId::Left, ChartPoint::new(ts("2025-05-08"), 1.0)).unwrap();
        c.measure_at(PaneId::Right, ChartPoint::new(ts("2025-05-08 09:30"), 2.0)).unwrap();
        c.measure_at(PaneId::Right, ChartPoint::new(ts("2025-05-08 09:40"), 2.0)).unwrap();

        assert!(c.clear_all_measurements());
        assert!(!c.clear_all_measurements());
        for pane in [PaneId::Left, PaneId::Right] {
            assert!(!c.measurement(pane).is_active());
        }
        assert!(!c.cross_measurement().is_active());
    }

    #[test]
    fn measurements_survive_navigation() {
        let mut c = controller();
        c.measure_at(PaneId::Left, ChartPoint::new(ts("2025-05-08"), 1.0)).unwrap();
        c.measure_at(PaneId::Left, ChartPoint::new(ts("2025-05-09"), 2.0)).unwrap();
        c.navigate(1).unwrap();
        assert!(c.measurement(PaneId::Left).measurement().is_some());
        // Not drawn on another ticker.
        let frame = c.frame(PaneId::Left).unwrap();
        assert!(!frame.overlays.iter().any(|o| matches!(o, Overlay::Marker { .. })));
        c.navigate(-1).unwrap();
        let frame = c.frame(PaneId::Left).unwrap();
        assert!(frame.overlays.iter().any(|o| matches!(o, Overlay::Marker { .. })));
    }

    #[test]
    fn double_click_maps_through_the_viewport() {
        let mut c = controller();
        c.double_click(PaneId::Right, 0.0, 0.0).unwrap();
        let first = c.measurement(PaneId::Right).pending().unwrap().clone();
        let (start, _) = c.pane(PaneId::Right).viewport().unwrap().time_range.unwrap();
        assert_eq!(first.timestamp, start);
        assert_eq!(first.ticker, "AAA");
    }

    #[test]
    fn drawings_follow_their_ticker() {
        let mut c = controller();
        c.arm_tool(PaneId::Left, DrawingTool::Horizontal);
        assert!(c.click(PaneId::Left, 0.5, 0.5).unwrap().is_some());
        assert!(c.frame(PaneId::Left).unwrap().overlays.iter().any(|o| matches!(o, Overlay::HorizontalLine { .. })));

        c.navigate(1).unwrap();
        assert!(!c.frame(PaneId::Left).unwrap().overlays.iter().any(|o| matches!(o, Overlay::HorizontalLine { .. })));
        c.navigate(-1).unwrap();
        assert_eq!(c.clear_toolbox(PaneId::Left), 1);
        assert_eq!(c.clear_toolbox(PaneId::Left), 0);
    }

    #[test]
    fn maximize_is_idempotent_and_restorable() {
        let mut c = controller();
        assert!(c.maximize(PaneId::Right));
        assert!(!c.maximize(PaneId::Right));
        assert_eq!(c.layout().maximized(), Some(PaneId::Right));
        assert!(!c.layout().is_visible(PaneId::Left));

        assert!(c.restore());
        assert!(!c.restore());
        assert!(c.toggle_maximize(PaneId::Left));
        assert!(c.toggle_maximize(PaneId::Left));
        assert_eq!(c.layout().maximized(), None);
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn export_returns_both_panes() {
        let c = controller();
        let images = c.export_screenshots().unwrap();
        assert_eq!(images.len(), 2);
        assert!(images.values().all(|bytes| !bytes.is_empty()));
        assert_eq!(images[&PaneId::Left], b"AAA 1D 2025-05-08".to_vec());
        assert_eq!(images[&PaneId::Right], b"AAA 1M 2025-05-08".to_vec());

        let batch = c.export_batch().unwrap();
        assert_eq!(batch[1].file_name(), "AAA_2025-05-08_chart2_screenshot.txt");
    }

    #[test]
    fn export_fails_for_an_unready_pane() {
        let left = RecordingSurface::default();
        let right = RecordingSurface {
            refuse: true,
            ..Default::default()
        };
        let c = DualChartController::new(
            Arc::new(three_tickers()),
            AppConfig::default(),
            Box::new(left),
            Box::new(right),
        )
        .unwrap();
        assert!(matches!(
            c.export_screenshots(),
            Err(ChartError::RenderUnavailable { pane: PaneId::Right, .. })
        ));
    }

    #[test]
    fn frames_carry_watermark_indicators_and_sessions() {
        let mut config = AppConfig::default();
        config.indicators = vec![IndicatorSpec::sma(5)];
        let (c, left, right) = controller_with(three_tickers(), config);

        let daily = left.last_frame().unwrap();
        assert_eq!(daily.watermark, "AAA 1D 2025-05-08");
        assert_eq!(daily.bars.len(), 61);
        assert!(daily.overlays.iter().any(|o| matches!(
            o,
            Overlay::IndicatorLine { name, points } if name == "SMA_5" && points.len() == 57
        )));
        assert!(!daily.overlays.iter().any(|o| matches!(o, Overlay::SessionSpan(_))));

        let intraday = right.last_frame().unwrap();
        let spans = intraday
            .overlays
            .iter()
            .filter(|o| matches!(o, Overlay::SessionSpan(_)))
            .count();
        assert_eq!(spans, 2);
        assert_eq!(c.frame(PaneId::Right).unwrap(), intraday);
    }

    #[test]
    fn selection_is_remembered_and_restored() {
        let mut c = controller();
        assert!(!c.preferences_dirty());
        c.navigate(1).unwrap();
        assert!(c.preferences_dirty());
        assert_eq!(c.config().cli.last_ticker.as_deref(), Some("BBB"));
        assert_eq!(c.config().cli.last_date.as_deref(), Some("2025-05-08"));
        c.mark_preferences_saved();

        let (restored, _, _) = controller_with(three_tickers(), c.config().clone());
        assert_eq!(restored.index(), 1);
    }

    #[test]
    fn single_chart_preference_maximizes_the_left_pane() {
        let mut config = AppConfig::default();
        config.chart.use_intraday_tf = false;
        let (c, _, _) = controller_with(three_tickers(), config);
        assert_eq!(c.layout().maximized(), Some(PaneId::Left));
    }

    #[test]
    fn reload_prunes_removed_instruments() {
        let mut c = controller();
        c.jump_to(2).unwrap();
        c.arm_tool(PaneId::Left, DrawingTool::Ray);
        c.click(PaneId::Left, 0.5, 0.5).unwrap();
        c.measure_at(PaneId::Left, ChartPoint::new(ts("2025-05-08"), 20.0)).unwrap();

        c.reload(Arc::new(zkin_store())).unwrap();
        assert_eq!(c.index(), 0);
        assert_eq!(c.pane(PaneId::Left).ticker(), Some("ZKIN"));
        assert!(c.pane(PaneId::Left).toolbox.is_empty());
        assert!(!c.measurement(PaneId::Left).is_active());
    }

    #[test]
    fn navigation_steps_over_instruments_without_bars() {
        let mut dataset = crate::data::fixtures::three_ticker_dataset();
        dataset.instruments.push(crate::domain::InstrumentRecord::new("BBZ"));
        dataset
            .entries
            .push(crate::data::ChartEntry::new("BBZ", crate::data::fixtures::date("2025-05-08")));
        let (mut c, _, _) = controller_with(dataset.into_store().unwrap(), AppConfig::default());

        assert_eq!(c.navigate(1).unwrap(), NavOutcome::Moved { from: 0, to: 1 });
        assert_eq!(c.navigate(1).unwrap(), NavOutcome::Moved { from: 1, to: 2 });
        assert_eq!(tickers(&c), ("CCC".to_string(), "CCC".to_string()));
    }

    #[test]
    fn empty_store_is_rejected() {
        let empty = TimeSeriesStore::new("empty", Vec::new(), Vec::new()).unwrap();
        let result = DualChartController::new(
            Arc::new(empty),
            AppConfig::default(),
            Box::new(RecordingSurface::default()),
            Box::new(RecordingSurface::default()),
        );
        assert!(matches!(result, Err(ChartError::InvalidData(_))));
    }
}
