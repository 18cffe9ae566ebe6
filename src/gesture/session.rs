use serde::{Deserialize, Serialize};

use crate::animation::TransitionRequest;
use crate::gesture::Feature;
use crate::sys::geometry::Rect;
use crate::sys::proxy::ProxyId;
use crate::sys::window::WindowId;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Swipe,
    Pinch,
}

/// Snap points of a pinch. The discriminant is the progress value of the
/// point.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PinchState {
    PinchIn = -1,
    Default = 0,
    PinchOut = 1,
}

impl PinchState {
    pub fn value(self) -> f64 { self as i8 as f64 }

    /// The allowed snap point closest to `progress`. Ties go to the point
    /// nearer DEFAULT.
    pub fn nearest(progress: f64, allowed: &[PinchState]) -> PinchState {
        allowed
            .iter()
            .copied()
            .min_by(|a, b| {
                let da = (a.value() - progress).abs();
                let db = (b.value() - progress).abs();
                da.total_cmp(&db).then(a.value().abs().total_cmp(&b.value().abs()))
            })
            .unwrap_or(PinchState::Default)
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    /// `begin` accepted and the snapshot captured, no update yet.
    Armed,
    Live,
}

/// Pre-gesture state captured at `begin`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Snapshot {
    pub proxy: Option<ProxyId>,
    pub window: Option<WindowId>,
    /// Window frame before the gesture started.
    pub frame: Rect,
    /// Where a maximize would put the window.
    pub maximized_box: Rect,
    pub already_maximized: bool,
    /// Toggle features: whether the target was already showing.
    pub open: bool,
}

/// Advisory label for what would happen if the gesture ended now.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PendingOutcome {
    #[default]
    Cancel,
    Toggle,
    Close,
    Minimize,
    Maximize,
    Launch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureSession {
    pub feature: Feature,
    pub kind: GestureKind,
    pub progress: f64,
    /// Progress after cubic shaping; equals `progress` outside the shaped half.
    pub shaped: f64,
    pub state: PinchState,
    pub snapshot: Snapshot,
    pub pending: PendingOutcome,
    /// The pinch-in choice (close or minimize) as of the last update on the
    /// pinch-in half.
    pub pinch_in: PendingOutcome,
}

impl GestureSession {
    pub fn new(feature: Feature, kind: GestureKind, progress: f64, snapshot: Snapshot) -> Self {
        GestureSession {
            feature,
            kind,
            progress,
            shaped: progress,
            state: PinchState::Default,
            snapshot,
            pending: PendingOutcome::Cancel,
            pinch_in: PendingOutcome::Close,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Cancel,
    /// `fire` is false when the target already reached the requested state
    /// without another keypress (e.g. a committed open).
    Toggle { fire: bool },
    Close { window: WindowId },
    Minimize { window: WindowId },
    Maximize { window: WindowId },
    Launch,
}

/// The terminal result of a gesture: which action fires and how the proxy
/// gets there.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub transition: TransitionRequest,
}
