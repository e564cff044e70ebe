//! Key and mouse bindings, and their dispatch to controller calls.

use std::collections::HashMap;
use std::fmt;

use crate::domain::{DrawingId, DrawingTool, PaneId};
use crate::engine::controller::{DualChartController, NavOutcome};
use crate::engine::export::ExportImage;
use crate::engine::measurement::Measurement;
use crate::error::ChartResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// A key plus modifiers, written like "shift+1" or "ctrl+x".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub modifiers: Modifiers,
    pub key: char,
}

impl KeyChord {
    pub fn parse(text: &str) -> Option<Self> {
        let mut modifiers = Modifiers::default();
        let mut key = None;
        for part in text.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "shift" => modifiers.shift = true,
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" => modifiers.alt = true,
                other => {
                    let mut chars = other.chars();
                    let (Some(c), None) = (chars.next(), chars.next()) else {
                        return None;
                    };
                    if key.replace(c).is_some() {
                        return None;
                    }
                }
            }
        }
        Some(Self {
            modifiers,
            key: key?,
        })
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            write!(f, "ctrl+")?;
        }
        if self.modifiers.alt {
            write!(f, "alt+")?;
        }
        if self.modifiers.shift {
            write!(f, "shift+")?;
        }
        write!(f, "{}", self.key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NextInstrument,
    PreviousInstrument,
    Screenshot,
    ArmTool(DrawingTool),
    ClearToolbox,
    ClearMeasurements,
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyChord, Action>,
}

const DEFAULT_BINDINGS: &[(&str, Action)] = &[
    ("shift+1", Action::NextInstrument),
    ("shift+2", Action::PreviousInstrument),
    ("shift+s", Action::Screenshot),
    ("alt+t", Action::ArmTool(DrawingTool::Trend)),
    ("alt+h", Action::ArmTool(DrawingTool::Horizontal)),
    ("alt+r", Action::ArmTool(DrawingTool::Ray)),
    ("ctrl+x", Action::ClearToolbox),
    ("shift+m", Action::ClearMeasurements),
];

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = DEFAULT_BINDINGS
            .iter()
            .filter_map(|(chord, action)| KeyChord::parse(chord).map(|c| (c, *action)))
            .collect();
        Self { bindings }
    }
}

impl KeyBindings {
    /// Bind `chord`, replacing whatever it did before. Returns false if the chord does not parse.
    pub fn bind(&mut self, chord: &str, action: Action) -> bool {
        match KeyChord::parse(chord) {
            Some(chord) => {
                self.bindings.insert(chord, action);
                true
            }
            None => false,
        }
    }

    pub fn action(&self, chord: &KeyChord) -> Option<Action> {
        self.bindings.get(chord).copied()
    }

    /// Chord/action pairs sorted by chord text, for help output.
    pub fn describe(&self) -> Vec<(String, Action)> {
        let mut pairs: Vec<(String, Action)> = self
            .bindings
            .iter()
            .map(|(chord, action)| (chord.to_string(), *action))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }
}

/// Raw input from the host, already attributed to the pane that had focus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key { pane: PaneId, chord: KeyChord },
    /// Normalised position inside the pane
    Click { pane: PaneId, x: f64, y: f64 },
    DoubleClick { pane: PaneId, x: f64, y: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Navigated(NavOutcome),
    /// Captures for the host to hand to an export sink
    Screenshots(Vec<ExportImage>),
    ToolArmed { pane: PaneId, tool: DrawingTool },
    ToolboxCleared { pane: PaneId, removed: usize },
    MeasurementsCleared(bool),
    Drawing(Option<DrawingId>),
    Measured(Option<Measurement>),
    /// No binding for this key
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct InputDispatch {
    pub bindings: KeyBindings,
}

impl InputDispatch {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn dispatch(
        &self,
        controller: &mut DualChartController,
        event: InputEvent,
    ) -> ChartResult<DispatchOutcome> {
        match event {
            InputEvent::Key { pane, chord } => match self.bindings.action(&chord) {
                Some(action) => Self::run(controller, pane, action),
                None => {
                    log::debug!("Unbound key {} on {}", chord, pane);
                    Ok(DispatchOutcome::Ignored)
                }
            },
            InputEvent::Click { pane, x, y } => {
                controller.click(pane, x, y).map(DispatchOutcome::Drawing)
            }
            InputEvent::DoubleClick { pane, x, y } => {
                controller.double_click(pane, x, y).map(DispatchOutcome::Measured)
            }
        }
    }

    /// Perform `action` as if its key was pressed on `pane`.
    pub fn run(
        controller: &mut DualChartController,
        pane: PaneId,
        action: Action,
    ) -> ChartResult<DispatchOutcome> {
        match action {
            Action::NextInstrument => controller.navigate(1).map(DispatchOutcome::Navigated),
            Action::PreviousInstrument => controller.navigate(-1).map(DispatchOutcome::Navigated),
            Action::Screenshot => controller.export_batch().map(DispatchOutcome::Screenshots),
            Action::ArmTool(tool) => {
                controller.arm_tool(pane, tool);
                Ok(DispatchOutcome::ToolArmed { pane, tool })
            }
            Action::ClearToolbox => {
                controller.disarm_tool(pane);
                let removed = controller.clear_toolbox(pane);
                Ok(DispatchOutcome::ToolboxCleared { pane, removed })
            }
            Action::ClearMeasurements => Ok(DispatchOutcome::MeasurementsCleared(
                controller.clear_all_measurements(),
            )),
        }
    }
}
