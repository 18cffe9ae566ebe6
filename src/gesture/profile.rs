//! Per-feature parameters for the shared state machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animation::Easing;
use crate::gesture::{GestureError, GestureKind, PinchState, ProgressAccumulator, Snapshot};
use crate::sys::proxy::ProxyId;
use crate::sys::window::WindowControl;

#[derive(
    Serialize,
    Deserialize,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::Display
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Feature {
    DropDownTerminal,
    Volume,
    WindowManipulation,
    Launcher,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToggleProfile {
    /// Application id of the window being toggled.
    pub app_id: String,
    pub snap_threshold: f64,
    pub commit_duration: Duration,
    pub cancel_duration: Duration,
    pub easing: Easing,
}

/// How a pinch-in close is carried out.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CloseMode {
    /// Ask the window manager to delete the window.
    #[default]
    Window,
    /// Send the close-document chord to the focused application.
    Document,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowPinchProfile {
    /// Shaped progress at or above which a maximized window minimizes instead
    /// of closing.
    pub minimize_threshold: f64,
    /// Scale a minimizing window settles at before it is unmaximized.
    pub minimize_scale: f64,
    /// Vertical inset of the maximized box for fullscreen windows, as a
    /// fraction of the work area height.
    pub fullscreen_inset: f64,
    pub easing: Easing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LauncherProfile {
    pub preview_width: f64,
    pub preview_height: f64,
    /// Multiplier from pinch progress to preview progress.
    pub progress_gain: f64,
    pub easing: Easing,
    /// The preview widget, created by the shell when the feature is set up.
    pub preview: Option<ProxyId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Toggle(ToggleProfile),
    WindowPinch(WindowPinchProfile),
    Launcher(LauncherProfile),
}

const THREE_WAY: [PinchState; 3] = [PinchState::PinchIn, PinchState::Default, PinchState::PinchOut];
const TWO_WAY: [PinchState; 2] = [PinchState::Default, PinchState::PinchOut];

impl Profile {
    pub fn feature(&self) -> Feature {
        match self {
            Profile::Toggle(_) => Feature::DropDownTerminal,
            Profile::WindowPinch(_) => Feature::WindowManipulation,
            Profile::Launcher(_) => Feature::Launcher,
        }
    }

    pub fn kind(&self) -> GestureKind {
        match self {
            Profile::Toggle(_) => GestureKind::Swipe,
            Profile::WindowPinch(_) | Profile::Launcher(_) => GestureKind::Pinch,
        }
    }

    pub fn allowed_states(&self) -> &'static [PinchState] {
        match self {
            Profile::Toggle(_) => &[],
            Profile::WindowPinch(_) => &THREE_WAY,
            Profile::Launcher(_) => &TWO_WAY,
        }
    }

    /// Swipes run over `[0, 1]`; pinches span their outermost snap points.
    pub fn accumulator(&self) -> ProgressAccumulator {
        match self {
            Profile::Toggle(_) => ProgressAccumulator::SWIPE,
            Profile::WindowPinch(_) => ProgressAccumulator::PINCH,
            Profile::Launcher(_) => ProgressAccumulator::SWIPE,
        }
    }

    pub fn validate(&self) -> Result<(), GestureError> {
        let fail = |msg: String| Err(GestureError::Configuration(msg));
        match self {
            Profile::Toggle(p) => {
                if !(p.snap_threshold > 0.0 && p.snap_threshold < 1.0) {
                    return fail(format!(
                        "snap threshold must be in (0, 1), got {}",
                        p.snap_threshold
                    ));
                }
                if p.commit_duration.is_zero() || p.cancel_duration.is_zero() {
                    return fail("toggle durations must be positive".to_string());
                }
            }
            Profile::WindowPinch(p) => {
                if !(p.minimize_threshold > 0.0 && p.minimize_threshold < 1.0) {
                    return fail(format!(
                        "minimize threshold must be in (0, 1), got {}",
                        p.minimize_threshold
                    ));
                }
                if !(0.0..=1.0).contains(&p.minimize_scale) {
                    return fail(format!(
                        "minimize scale must be in [0, 1], got {}",
                        p.minimize_scale
                    ));
                }
                if !(0.0..0.5).contains(&p.fullscreen_inset) {
                    return fail(format!(
                        "fullscreen inset must be in [0, 0.5), got {}",
                        p.fullscreen_inset
                    ));
                }
            }
            Profile::Launcher(p) => {
                if p.preview_width <= 0.0 || p.preview_height <= 0.0 {
                    return fail("launcher preview must have a positive size".to_string());
                }
                if !(p.progress_gain > 0.0 && p.progress_gain.is_finite()) {
                    return fail(format!(
                        "launcher progress gain must be positive, got {}",
                        p.progress_gain
                    ));
                }
            }
        }
        Ok(())
    }

    /// Reads the pre-gesture state from the window manager.
    pub fn capture(&self, windows: &dyn WindowControl) -> Result<Snapshot, GestureError> {
        match self {
            Profile::Toggle(p) => {
                let focused = windows.focused_window();
                let open = focused.as_ref().and_then(|w| w.app_id.as_deref())
                    == Some(p.app_id.as_str());
                let mut snapshot = Snapshot { open, ..Snapshot::default() };
                if open {
                    if let Some(w) = focused {
                        snapshot.window = Some(w.id);
                        snapshot.proxy = w.proxy;
                        snapshot.frame = windows.frame_rect(w.id).unwrap_or_default();
                    }
                }
                Ok(snapshot)
            }
            Profile::WindowPinch(p) => {
                let focused = windows.focused_window().ok_or(GestureError::NoFocusedWindow)?;
                let frame = windows.frame_rect(focused.id).ok_or(GestureError::NoFocusedWindow)?;
                let work_area = windows.work_area(focused.monitor);
                let maximized_box = if windows.is_fullscreen(focused.id) {
                    work_area.inset_vertical(p.fullscreen_inset)
                } else {
                    work_area
                };
                Ok(Snapshot {
                    proxy: focused.proxy,
                    window: Some(focused.id),
                    frame,
                    maximized_box,
                    already_maximized: windows.is_maximized(focused.id),
                    open: true,
                })
            }
            Profile::Launcher(p) => Ok(Snapshot {
                proxy: p.preview,
                frame: windows.screen_rect().centered(p.preview_width, p.preview_height),
                ..Snapshot::default()
            }),
        }
    }
}

impl Default for ToggleProfile {
    fn default() -> Self {
        ToggleProfile {
            app_id: "com.github.amezin.ddterm".to_string(),
            snap_threshold: 0.2,
            commit_duration: Duration::from_millis(400),
            cancel_duration: Duration::from_millis(100),
            easing: Easing::EaseOutQuad,
        }
    }
}

impl Default for WindowPinchProfile {
    fn default() -> Self {
        WindowPinchProfile {
            minimize_threshold: 0.8,
            minimize_scale: 0.8,
            fullscreen_inset: 0.025,
            easing: Easing::EaseOutQuad,
        }
    }
}

impl Default for LauncherProfile {
    fn default() -> Self {
        LauncherProfile {
            preview_width: 725.0,
            preview_height: 180.0,
            progress_gain: 3.0,
            easing: Easing::EaseOutQuad,
            preview: None,
        }
    }
}
