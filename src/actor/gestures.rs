//! The gesture actor.
//!
//! Receives recognizer callbacks and compositor notifications as [`Event`]s,
//! drives one state machine per feature, and runs outcomes through the
//! transition orchestrator and the action dispatcher.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};

use crate::actor;
use crate::animation::{BatchId, Completion, TransitionOrchestrator};
use crate::common::collections::HashMap;
use crate::common::config::Config;
use crate::dispatch::ActionDispatcher;
use crate::gesture::{
    Feature, GestureError, GestureStateMachine, OutcomeKind, PinchState, Profile,
};
use crate::sys::keyboard::KeyInjector;
use crate::sys::proxy::{ProxyId, VisualProxyHost};
use crate::sys::recognizer::GestureRecognizer;
use crate::sys::volume::VolumeService;
use crate::sys::window::{WindowControl, WindowInfo};
use crate::volume::VolumeGesture;

pub mod replay;
#[cfg(test)]
pub mod testing;

const LAUNCHER_STYLE_CLASS: &str = "gesture-launcher-preview";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    GestureBegin {
        feature: Feature,
    },
    GestureUpdate {
        feature: Feature,
        delta: f64,
        distance: f64,
    },
    GestureEnd {
        feature: Feature,
        /// Animation length suggested by the recognizer.
        #[serde(default)]
        duration_ms: u64,
        /// Snap point the recognizer settled on, for pinches.
        #[serde(default)]
        final_state: Option<PinchState>,
    },
    TransitionsCompleted {
        proxy: ProxyId,
        batch: BatchId,
    },
    ProxyDestroyed(ProxyId),
    WindowCreated(WindowInfo),
    DefaultSinkChanged,
    Stop,
}

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

pub fn channel() -> (Sender, Receiver) { actor::channel() }

/// Everything the actor needs from the shell.
pub struct Capabilities {
    pub visuals: Box<dyn VisualProxyHost>,
    pub windows: Box<dyn WindowControl>,
    pub keyboard: Box<dyn KeyInjector>,
    pub recognizer: Box<dyn GestureRecognizer>,
    /// Required only when the volume gesture is enabled.
    pub mixer: Option<Arc<dyn VolumeService>>,
}

pub struct GestureActor {
    machines: HashMap<Feature, GestureStateMachine>,
    volume: Option<VolumeGesture>,
    orchestrator: TransitionOrchestrator,
    dispatcher: ActionDispatcher,
    caps: Capabilities,
}

impl GestureActor {
    /// Validates `config`, registers every enabled feature with the
    /// recognizer and creates the launcher preview. Any remaining config
    /// issue is fatal.
    pub fn new(config: &Config, mut caps: Capabilities) -> Result<Self, GestureError> {
        let issues = config.validate();
        if !issues.is_empty() {
            return Err(GestureError::Configuration(issues.join("; ")));
        }

        let mut machines = HashMap::default();
        let mut volume = None;
        for registration in config.registrations() {
            match registration.feature {
                Feature::DropDownTerminal => {
                    machines.insert(
                        Feature::DropDownTerminal,
                        GestureStateMachine::new(config.terminal.profile())?,
                    );
                }
                Feature::WindowManipulation => {
                    machines.insert(
                        Feature::WindowManipulation,
                        GestureStateMachine::new(config.window_manipulation.profile())?,
                    );
                }
                Feature::Launcher => {
                    let mut profile = config.launcher.profile();
                    if let Profile::Launcher(launcher) = &mut profile {
                        launcher.preview = Some(caps.visuals.create_widget(LAUNCHER_STYLE_CLASS));
                    }
                    machines.insert(Feature::Launcher, GestureStateMachine::new(profile)?);
                }
                Feature::Volume => {
                    let mixer = caps.mixer.clone().ok_or_else(|| {
                        GestureError::Configuration(
                            "volume gesture is enabled but no mixer is available".to_string(),
                        )
                    })?;
                    volume = Some(VolumeGesture::new(mixer));
                }
            }
            caps.recognizer.register(&registration);
            info!(
                feature = %registration.feature,
                fingers = ?registration.fingers,
                orientation = ?registration.orientation,
                "registered gesture"
            );
        }

        Ok(GestureActor {
            machines,
            volume,
            orchestrator: TransitionOrchestrator::new(),
            dispatcher: config.dispatcher(),
            caps,
        })
    }

    pub fn machine(&self, feature: Feature) -> Option<&GestureStateMachine> {
        self.machines.get(&feature)
    }

    pub fn orchestrator(&self) -> &TransitionOrchestrator { &self.orchestrator }

    pub async fn run(mut self, mut events: Receiver) {
        while let Some((span, event)) = events.recv().await {
            let _guard = span.enter();
            if event == Event::Stop {
                debug!("gesture actor stopping");
                break;
            }
            self.handle_event(event);
        }
    }

    #[instrument(name = "gestures::handle_event", skip(self))]
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::GestureBegin { feature } => match self.begin(feature) {
                Ok(()) => {}
                Err(err @ (GestureError::NoFocusedWindow | GestureError::VetoedGesture(_))) => {
                    debug!(%err, "gesture not started")
                }
                Err(err) => warn!(%err, "gesture not started"),
            },
            Event::GestureUpdate { feature, delta, distance } => {
                self.update(feature, delta, distance)
            }
            Event::GestureEnd { feature, duration_ms, final_state } => {
                self.end(feature, final_state, Duration::from_millis(duration_ms))
            }
            Event::TransitionsCompleted { proxy, batch } => {
                if let Some(completion) = self.orchestrator.on_transitions_completed(proxy, batch) {
                    self.complete(Some(proxy), completion);
                }
            }
            Event::ProxyDestroyed(proxy) => {
                self.orchestrator.on_proxy_destroyed(proxy);
            }
            Event::WindowCreated(window) => {
                for machine in self.machines.values_mut() {
                    machine.attach_window(&window, &mut *self.caps.visuals);
                }
            }
            Event::DefaultSinkChanged => {
                if let Some(volume) = &self.volume {
                    volume.on_default_sink_changed();
                }
            }
            Event::Stop => {}
        }
    }

    fn begin(&mut self, feature: Feature) -> Result<(), GestureError> {
        if !self.caps.recognizer.is_allowed(feature) {
            return Err(GestureError::VetoedGesture(feature));
        }

        if feature == Feature::Volume {
            match &mut self.volume {
                Some(volume) => volume.begin(),
                None => trace!("volume gesture not enabled"),
            }
            return Ok(());
        }

        let Some(machine) = self.machines.get_mut(&feature) else {
            trace!(%feature, "gesture not enabled");
            return Ok(());
        };
        let mut snapshot = match machine.profile().capture(&*self.caps.windows) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                // The new begin still ends whatever was live.
                if machine.discard(&mut *self.caps.visuals).is_some() {
                    debug!(%feature, "begin without a target discarded the live session");
                }
                return Err(err);
            }
        };

        let toggle = matches!(machine.profile(), Profile::Toggle(_));
        // An open that is being replaced already sent the toggle hotkey, so
        // the terminal it mapped carries over instead of being toggled again.
        let carried = machine
            .session()
            .filter(|live| toggle && !live.snapshot.open && !snapshot.open);
        if let Some(live) = carried {
            snapshot.window = live.snapshot.window;
            snapshot.proxy = live.snapshot.proxy;
            snapshot.frame = live.snapshot.frame;
        }
        let opening = toggle && !snapshot.open && carried.is_none();
        machine.begin(snapshot, &mut *self.caps.visuals);

        if opening {
            // Map the terminal now so the swipe can drag it in. A cancel
            // toggles it away again.
            self.dispatcher.dispatch(
                &OutcomeKind::Toggle { fire: true },
                &mut *self.caps.windows,
                &mut *self.caps.keyboard,
            );
        }
        Ok(())
    }

    fn update(&mut self, feature: Feature, delta: f64, distance: f64) {
        if feature == Feature::Volume {
            if let Some(volume) = &mut self.volume {
                volume.update(delta, distance);
            }
            return;
        }
        if let Some(machine) = self.machines.get_mut(&feature) {
            machine.update(delta, distance, &mut *self.caps.visuals);
        }
    }

    fn end(&mut self, feature: Feature, final_state: Option<PinchState>, duration: Duration) {
        if feature == Feature::Volume {
            if let Some(volume) = &mut self.volume {
                volume.end();
            }
            return;
        }
        let Some(machine) = self.machines.get_mut(&feature) else { return };
        let Some(resolution) = machine.end(final_state, duration) else {
            trace!(%feature, "end without a live session");
            return;
        };

        let completion = Completion {
            feature: resolution.feature,
            outcome: resolution.outcome.kind,
            rest: resolution.rest,
        };
        if let Some(completion) = self.orchestrator.resolve(
            &mut *self.caps.visuals,
            resolution.proxy,
            &resolution.outcome.transition,
            completion,
        ) {
            self.complete(resolution.proxy, completion);
        }
    }

    /// Fires the outcome's action, then puts the proxy back at rest.
    fn complete(&mut self, proxy: Option<ProxyId>, completion: Completion) {
        debug!(feature = %completion.feature, outcome = ?completion.outcome, "transition finished");
        self.dispatcher.dispatch(
            &completion.outcome,
            &mut *self.caps.windows,
            &mut *self.caps.keyboard,
        );
        if let Some(proxy) = proxy {
            TransitionOrchestrator::settle(&mut *self.caps.visuals, proxy, &completion.rest);
        }
    }
}
