use serde::{Deserialize, Serialize};

/// One of the two chart regions in dual mode.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::EnumIter,
    strum_macros::Display,
)]
pub enum PaneId {
    #[strum(to_string = "Chart 1")]
    Left,
    #[strum(to_string = "Chart 2")]
    Right,
}

impl PaneId {
    /// 1-based number used in labels and screenshot names.
    pub fn number(&self) -> usize {
        match self {
            PaneId::Left => 1,
            PaneId::Right => 2,
        }
    }

    pub fn other(&self) -> PaneId {
        match self {
            PaneId::Left => PaneId::Right,
            PaneId::Right => PaneId::Left,
        }
    }

    pub(crate) fn slot(&self) -> usize {
        self.number() - 1
    }

    /// Accepts "left"/"right", "1"/"2".
    pub fn parse(text: &str) -> Option<PaneId> {
        match text.trim().to_ascii_lowercase().as_str() {
            "left" | "l" | "1" => Some(PaneId::Left),
            "right" | "r" | "2" => Some(PaneId::Right),
            _ => None,
        }
    }
}
