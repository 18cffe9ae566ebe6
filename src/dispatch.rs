//! Turns a resolved outcome into its single external side effect.

use tracing::info;

use crate::gesture::{CloseMode, OutcomeKind};
use crate::sys::keyboard::KeyInjector;
use crate::sys::keys::KeyChord;
use crate::sys::window::{WindowControl, WindowId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SendKeys(KeyChord),
    CloseWindow(WindowId),
    Unmaximize(WindowId),
    Maximize(WindowId),
}

#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    pub toggle_keys: KeyChord,
    pub launcher_keys: KeyChord,
    pub close_mode: CloseMode,
    pub close_document_keys: KeyChord,
}

impl ActionDispatcher {
    pub fn action_for(&self, outcome: &OutcomeKind) -> Option<Action> {
        match *outcome {
            OutcomeKind::Cancel => None,
            OutcomeKind::Toggle { fire: false } => None,
            OutcomeKind::Toggle { fire: true } => Some(Action::SendKeys(self.toggle_keys.clone())),
            OutcomeKind::Close { window } => Some(match self.close_mode {
                CloseMode::Window => Action::CloseWindow(window),
                CloseMode::Document => Action::SendKeys(self.close_document_keys.clone()),
            }),
            OutcomeKind::Minimize { window } => Some(Action::Unmaximize(window)),
            OutcomeKind::Maximize { window } => Some(Action::Maximize(window)),
            OutcomeKind::Launch => Some(Action::SendKeys(self.launcher_keys.clone())),
        }
    }

    /// Performs the outcome's action, if it has one, without waiting for it
    /// to take effect. Returns what was done.
    pub fn dispatch(
        &self,
        outcome: &OutcomeKind,
        windows: &mut dyn WindowControl,
        keys: &mut dyn KeyInjector,
    ) -> Option<Action> {
        let action = self.action_for(outcome)?;
        info!(?action, "dispatching gesture action");
        match &action {
            Action::SendKeys(chord) => keys.send_key_chord(chord),
            Action::CloseWindow(window) => windows.request_close(*window),
            Action::Unmaximize(window) => windows.unmaximize(*window),
            Action::Maximize(window) => windows.maximize(*window),
        }
        Some(action)
    }
}

impl Default for ActionDispatcher {
    fn default() -> Self {
        use crate::sys::keys::KeyCode::*;
        ActionDispatcher {
            toggle_keys: KeyChord::new(vec![F12]),
            launcher_keys: KeyChord::new(vec![SuperL, Slash]),
            close_mode: CloseMode::Window,
            close_document_keys: KeyChord::new(vec![ControlL, KeyW]),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::actor::gestures::testing::{Call, Recorder, TestKeyboard, TestWindows};

    #[test]
    fn each_outcome_maps_to_one_call() {
        let recorder = Recorder::new();
        let mut windows = TestWindows::new(&recorder);
        let mut keys = TestKeyboard::new(&recorder);
        let dispatcher = ActionDispatcher::default();
        let w = WindowId(4);

        for outcome in [
            OutcomeKind::Cancel,
            OutcomeKind::Toggle { fire: false },
            OutcomeKind::Toggle { fire: true },
            OutcomeKind::Close { window: w },
            OutcomeKind::Minimize { window: w },
            OutcomeKind::Maximize { window: w },
            OutcomeKind::Launch,
        ] {
            dispatcher.dispatch(&outcome, &mut windows, &mut keys);
        }

        assert_eq!(
            recorder.calls(),
            vec![
                Call::Keys("F12".parse().unwrap()),
                Call::RequestClose(w),
                Call::Unmaximize(w),
                Call::Maximize(w),
                Call::Keys("Meta + Slash".parse().unwrap()),
            ]
        );
    }

    #[test]
    fn document_mode_closes_with_a_chord() {
        let dispatcher = ActionDispatcher {
            close_mode: CloseMode::Document,
            ..ActionDispatcher::default()
        };
        assert_eq!(
            dispatcher.action_for(&OutcomeKind::Close { window: WindowId(1) }),
            Some(Action::SendKeys("Ctrl + W".parse().unwrap()))
        );
        assert_eq!(
            dispatcher.action_for(&OutcomeKind::Maximize { window: WindowId(1) }),
            Some(Action::Maximize(WindowId(1)))
        );
    }
}
