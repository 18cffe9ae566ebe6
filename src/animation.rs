//! Declarative transitions handed to the compositor, and the bookkeeping that
//! turns their completions into exactly one notification per gesture.

pub mod easing;
pub mod orchestrator;
pub mod transition;

pub use easing::Easing;
pub use orchestrator::{BatchId, Completion, TransitionOrchestrator};
pub use transition::{Property, PropertyTransition, RestState, TransitionRequest, TransitionTarget};
