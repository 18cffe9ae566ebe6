use serde::{Deserialize, Serialize};

use crate::gesture::Feature;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
    Pinch,
}

/// Shell modes in which a gesture is recognized.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionMode {
    /// Only while no modal UI (overview, lock screen, ...) is up.
    Normal,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub feature: Feature,
    pub fingers: Vec<u8>,
    pub orientation: Orientation,
    pub mode: ActionMode,
}

pub trait GestureRecognizer {
    fn register(&mut self, registration: &Registration);

    /// Veto consulted before a `begin` is accepted. Recognizers return false
    /// e.g. when the fingers were held in place before moving.
    fn is_allowed(&self, feature: Feature) -> bool;
}
