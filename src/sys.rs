//! Capability interfaces onto the desktop shell.
//!
//! Everything the gesture core needs from the outside world (the compositor,
//! the window manager, the virtual keyboard, the audio mixer and the gesture
//! recognizer) is expressed as a trait here. `headless` provides a logging
//! implementation used by the binary for replays.

pub mod geometry;
pub mod headless;
pub mod keyboard;
pub mod keys;
pub mod proxy;
pub mod recognizer;
pub mod volume;
pub mod window;
