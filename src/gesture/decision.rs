//! Commit-or-cancel rules.
//!
//! Swipes snap on a threshold evaluated at release. Pinches don't threshold at
//! release at all: the recognizer's final snap point picks the outcome class,
//! and the close/minimize choice was already made by the last update on the
//! pinch-in half.

use crate::gesture::{PendingOutcome, PinchState};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Commit,
    Cancel,
}

/// What a toggle gesture is trying to do, fixed at `begin`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Intent {
    Open,
    Close,
}

/// Opening commits once progress passes `snap`; closing commits once it falls
/// below `1 - snap`. Both comparisons are strict.
pub fn swipe(intent: Intent, progress: f64, snap: f64) -> Decision {
    let commit = match intent {
        Intent::Open => progress > snap,
        Intent::Close => progress < 1.0 - snap,
    };
    if commit { Decision::Commit } else { Decision::Cancel }
}

/// `sign(x) * |x|^3`: slow near zero, full speed near the ends.
pub fn shape_cubic(x: f64) -> f64 { x.signum() * x.abs().powi(3) }

/// Close or minimize for the pinch-in half. A window that was maximized
/// before the gesture minimizes (unmaximizes) as long as the shaped progress
/// stays at or above `threshold`; pinching further closes it. Windows that
/// weren't maximized always close.
pub fn pinch_in(shaped: f64, already_maximized: bool, threshold: f64) -> PendingOutcome {
    if already_maximized && shaped >= threshold {
        PendingOutcome::Minimize
    } else {
        PendingOutcome::Close
    }
}

/// Outcome class selected by the final pinch state. `pinch_in_choice` is the
/// choice recorded by the last update on the pinch-in half.
pub fn pinch(state: PinchState, pinch_in_choice: PendingOutcome) -> PendingOutcome {
    match state {
        PinchState::Default => PendingOutcome::Cancel,
        PinchState::PinchIn => pinch_in_choice,
        PinchState::PinchOut => PendingOutcome::Maximize,
    }
}
