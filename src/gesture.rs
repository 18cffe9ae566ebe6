//! The gesture core: progress accumulation, the per-feature state machine and
//! the commit-or-cancel decision.

pub mod decision;
pub mod error;
pub mod machine;
pub mod profile;
pub mod progress;
pub mod session;

pub use decision::Decision;
pub use error::GestureError;
pub use machine::{GestureStateMachine, Resolution};
pub use profile::{CloseMode, Feature, LauncherProfile, Profile, ToggleProfile, WindowPinchProfile};
pub use progress::ProgressAccumulator;
pub use session::{
    GestureKind, GestureSession, Outcome, OutcomeKind, PendingOutcome, Phase, PinchState, Snapshot,
};
