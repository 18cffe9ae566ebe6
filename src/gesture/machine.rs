//! One state machine for every commit-or-cancel gesture.
//!
//! The machine owns at most one [`GestureSession`]. `begin` replaces it,
//! `update` feeds it, `end` consumes it and yields a [`Resolution`] that the
//! caller hands to the transition orchestrator. All per-feature behavior
//! comes from the [`Profile`].

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::animation::{Property, RestState, TransitionOrchestrator, TransitionRequest};
use crate::gesture::decision::{self, Decision, Intent};
use crate::gesture::{
    Feature, GestureError, GestureSession, Outcome, OutcomeKind, PendingOutcome, Phase, PinchState,
    Profile, ProgressAccumulator, Snapshot,
};
use crate::sys::geometry::lerp;
use crate::sys::proxy::{ProxyId, VisualProxyHost};
use crate::sys::window::WindowInfo;

const OPAQUE: f64 = 255.0;
const TRANSPARENT: f64 = 0.0;

/// Everything needed to finish a gesture once `end` has been called.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub feature: Feature,
    pub proxy: Option<ProxyId>,
    pub outcome: Outcome,
    pub rest: RestState,
}

#[derive(Debug)]
pub struct GestureStateMachine {
    profile: Profile,
    accumulator: ProgressAccumulator,
    phase: Phase,
    session: Option<GestureSession>,
}

impl GestureStateMachine {
    pub fn new(profile: Profile) -> Result<Self, GestureError> {
        profile.validate()?;
        Ok(GestureStateMachine {
            accumulator: profile.accumulator(),
            profile,
            phase: Phase::Idle,
            session: None,
        })
    }

    pub fn feature(&self) -> Feature { self.profile.feature() }

    pub fn profile(&self) -> &Profile { &self.profile }

    pub fn profile_mut(&mut self) -> &mut Profile { &mut self.profile }

    pub fn phase(&self) -> Phase { self.phase }

    pub fn session(&self) -> Option<&GestureSession> { self.session.as_ref() }

    /// Starts a session from `snapshot` and puts the proxy into its starting
    /// pose. Returns the session this one replaced, if any; the replaced
    /// session is discarded without resolving, so nothing fires for it.
    pub fn begin(
        &mut self,
        snapshot: Snapshot,
        visuals: &mut dyn VisualProxyHost,
    ) -> Option<GestureSession> {
        let discarded = self.discard(visuals);
        if discarded.is_some() {
            debug!(feature = %self.feature(), "new begin discarded the live session");
        }

        let start = match &self.profile {
            Profile::Toggle(_) if snapshot.open => 1.0,
            _ => 0.0,
        };
        let session = GestureSession::new(self.feature(), self.profile.kind(), start, snapshot);
        if let Some(proxy) = session.snapshot.proxy {
            if let Err(err) = self.start_pose(&session, proxy, visuals) {
                debug!(%err, "could not pose proxy at begin");
            }
        }
        self.session = Some(session);
        self.phase = Phase::Armed;
        discarded
    }

    /// Drops the current session, if any, without resolving it. Its proxy is
    /// snapped back to the pose a cancel would have left it in.
    pub fn discard(&mut self, visuals: &mut dyn VisualProxyHost) -> Option<GestureSession> {
        self.phase = Phase::Idle;
        let session = self.session.take()?;
        if let Some(proxy) = session.snapshot.proxy {
            TransitionOrchestrator::settle(visuals, proxy, &self.cancel_pose(&session.snapshot));
        }
        Some(session)
    }

    /// Where a cancelled session leaves its proxy.
    fn cancel_pose(&self, snapshot: &Snapshot) -> RestState {
        match &self.profile {
            Profile::Toggle(_) => {
                let (scale, opacity) = if snapshot.open { (1.0, OPAQUE) } else { (0.0, TRANSPARENT) };
                RestState {
                    properties: vec![
                        (Property::ScaleX, 1.0),
                        (Property::ScaleY, scale),
                        (Property::Opacity, opacity),
                    ],
                    hide: false,
                }
            }
            Profile::WindowPinch(_) => {
                let frame = snapshot.frame;
                RestState {
                    properties: vec![
                        (Property::X, frame.x),
                        (Property::Y, frame.y),
                        (Property::Width, frame.width),
                        (Property::Height, frame.height),
                        (Property::ScaleX, 1.0),
                        (Property::ScaleY, 1.0),
                        (Property::Opacity, OPAQUE),
                    ],
                    hide: false,
                }
            }
            Profile::Launcher(_) => RestState {
                properties: vec![
                    (Property::Opacity, TRANSPARENT),
                    (Property::ScaleX, 1.0),
                    (Property::ScaleY, 1.0),
                ],
                hide: true,
            },
        }
    }

    /// Binds a window that appeared after `begin`, e.g. a terminal that was
    /// only mapped by the gesture itself. Returns true if it was adopted.
    pub fn attach_window(&mut self, window: &WindowInfo, visuals: &mut dyn VisualProxyHost) -> bool {
        let Profile::Toggle(toggle) = &self.profile else {
            return false;
        };
        if window.app_id.as_deref() != Some(toggle.app_id.as_str()) {
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.snapshot.proxy.is_some() {
            return false;
        }
        session.snapshot.window = Some(window.id);
        session.snapshot.proxy = window.proxy;
        debug!(window = ?window.id, "toggled window appeared mid-gesture");

        if let Some(proxy) = window.proxy {
            let session = session.clone();
            let result = self.preview(&session, proxy, visuals);
            if let Err(err) = result {
                debug!(%err, "could not preview newly attached window");
            }
        }
        true
    }

    /// Advances the live session by `delta / distance` and refreshes the
    /// preview. Without a session this is a no-op. Returns the advisory
    /// pending outcome.
    pub fn update(
        &mut self,
        delta: f64,
        distance: f64,
        visuals: &mut dyn VisualProxyHost,
    ) -> Option<PendingOutcome> {
        let session = self.session.as_mut()?;
        let progress = match self.accumulator.advance(session.progress, delta, distance) {
            Ok(progress) => progress,
            Err(err) => {
                warn!(feature = %session.feature, %err, "dropping gesture update");
                return Some(session.pending);
            }
        };
        session.progress = progress;
        self.phase = Phase::Live;

        match &self.profile {
            Profile::Toggle(toggle) => {
                session.shaped = progress;
                let intent = intent_of(&session.snapshot);
                session.pending = match decision::swipe(intent, progress, toggle.snap_threshold) {
                    Decision::Commit => PendingOutcome::Toggle,
                    Decision::Cancel => PendingOutcome::Cancel,
                };
            }
            Profile::WindowPinch(pinch) => {
                session.state = PinchState::nearest(progress, self.profile.allowed_states());
                if progress <= 0.0 {
                    session.shaped = decision::shape_cubic(1.0 + progress);
                    session.pinch_in = decision::pinch_in(
                        session.shaped,
                        session.snapshot.already_maximized,
                        pinch.minimize_threshold,
                    );
                } else {
                    session.shaped = progress;
                }
                session.pending = decision::pinch(session.state, session.pinch_in);
            }
            Profile::Launcher(launcher) => {
                session.state = PinchState::nearest(progress, self.profile.allowed_states());
                session.shaped = (progress * launcher.progress_gain).clamp(0.0, 1.0);
                session.pending = match session.state {
                    PinchState::PinchOut => PendingOutcome::Launch,
                    _ => PendingOutcome::Cancel,
                };
            }
        }
        trace!(
            feature = %session.feature,
            progress = session.progress,
            shaped = session.shaped,
            pending = ?session.pending,
            "gesture update"
        );

        let pending = session.pending;
        if let Some(proxy) = session.snapshot.proxy {
            let session = session.clone();
            if let Err(err) = self.preview(&session, proxy, visuals) {
                debug!(%err, "preview update failed");
            }
        }
        Some(pending)
    }

    /// Ends the session. `final_state` is the recognizer's snap point for
    /// pinches; when absent the point nearest the last progress is used.
    /// `duration` is the recognizer's suggested animation length; toggles use
    /// their own durations instead. A second `end` returns `None`.
    pub fn end(&mut self, final_state: Option<PinchState>, duration: Duration) -> Option<Resolution> {
        let session = self.session.take()?;
        self.phase = Phase::Idle;
        let resolution = self.resolve(session, final_state, duration);
        debug!(feature = %resolution.feature, outcome = ?resolution.outcome.kind, "gesture resolved");
        Some(resolution)
    }

    fn resolve(
        &self,
        session: GestureSession,
        final_state: Option<PinchState>,
        duration: Duration,
    ) -> Resolution {
        let snapshot = &session.snapshot;
        let (outcome, rest) = match &self.profile {
            Profile::Toggle(toggle) => {
                let intent = intent_of(snapshot);
                let decision = decision::swipe(intent, session.progress, toggle.snap_threshold);
                let (visible, duration, kind) = match (decision, intent) {
                    (Decision::Commit, Intent::Open) => {
                        (true, toggle.commit_duration, OutcomeKind::Toggle { fire: false })
                    }
                    (Decision::Commit, Intent::Close) => {
                        (false, toggle.commit_duration, OutcomeKind::Toggle { fire: true })
                    }
                    // The open was already requested at begin, so backing out
                    // of it takes another toggle.
                    (Decision::Cancel, Intent::Open) => {
                        (false, toggle.cancel_duration, OutcomeKind::Toggle { fire: true })
                    }
                    (Decision::Cancel, Intent::Close) => {
                        (true, toggle.cancel_duration, OutcomeKind::Cancel)
                    }
                };
                let transition = TransitionRequest::new(duration, toggle.easing)
                    .with_opacity(if visible { OPAQUE } else { TRANSPARENT })
                    .with(Property::ScaleY, if visible { 1.0 } else { 0.0 });
                (Outcome { kind, transition }, RestState::default())
            }
            Profile::WindowPinch(pinch) => {
                let state = final_state
                    .filter(|s| self.profile.allowed_states().contains(s))
                    .unwrap_or_else(|| {
                        PinchState::nearest(session.progress, self.profile.allowed_states())
                    });
                let request = TransitionRequest::new(duration, pinch.easing);
                let window = snapshot.window;
                let (kind, transition) = match (decision::pinch(state, session.pinch_in), window) {
                    (PendingOutcome::Close, Some(window)) => (
                        OutcomeKind::Close { window },
                        request.with_opacity(TRANSPARENT).with_scale(0.0),
                    ),
                    (PendingOutcome::Minimize, Some(window)) => (
                        OutcomeKind::Minimize { window },
                        request.with_opacity(OPAQUE).with_scale(pinch.minimize_scale),
                    ),
                    (PendingOutcome::Maximize, Some(window)) => (
                        OutcomeKind::Maximize { window },
                        request.with_rect(snapshot.maximized_box),
                    ),
                    _ => (
                        OutcomeKind::Cancel,
                        request.with_rect(snapshot.frame).with_opacity(OPAQUE).with_scale(1.0),
                    ),
                };
                let rest = RestState {
                    properties: vec![
                        (Property::ScaleX, 1.0),
                        (Property::ScaleY, 1.0),
                        (Property::Opacity, OPAQUE),
                    ],
                    hide: false,
                };
                (Outcome { kind, transition }, rest)
            }
            Profile::Launcher(launcher) => {
                let state = final_state
                    .filter(|s| self.profile.allowed_states().contains(s))
                    .unwrap_or_else(|| {
                        PinchState::nearest(session.progress, self.profile.allowed_states())
                    });
                let request = TransitionRequest::new(duration, launcher.easing);
                let (kind, transition) = match state {
                    PinchState::PinchOut => {
                        (OutcomeKind::Launch, request.with_opacity(OPAQUE).with_scale(1.0))
                    }
                    _ => (OutcomeKind::Cancel, request.with_opacity(TRANSPARENT).with_scale(0.0)),
                };
                let rest = RestState {
                    properties: vec![
                        (Property::Opacity, TRANSPARENT),
                        (Property::ScaleX, 1.0),
                        (Property::ScaleY, 1.0),
                    ],
                    hide: true,
                };
                (Outcome { kind, transition }, rest)
            }
        };

        Resolution {
            feature: session.feature,
            proxy: snapshot.proxy,
            outcome,
            rest,
        }
    }

    fn start_pose(
        &self,
        session: &GestureSession,
        proxy: ProxyId,
        visuals: &mut dyn VisualProxyHost,
    ) -> Result<(), GestureError> {
        match &self.profile {
            Profile::Toggle(_) => self.preview(session, proxy, visuals),
            Profile::WindowPinch(_) => Ok(()),
            Profile::Launcher(_) => {
                let frame = session.snapshot.frame;
                visuals.set_properties(
                    proxy,
                    &[
                        (Property::X, frame.x),
                        (Property::Y, frame.y),
                        (Property::Width, frame.width),
                        (Property::Height, frame.height),
                        (Property::Opacity, TRANSPARENT),
                    ],
                )?;
                visuals.set_visible(proxy, true)
            }
        }
    }

    fn preview(
        &self,
        session: &GestureSession,
        proxy: ProxyId,
        visuals: &mut dyn VisualProxyHost,
    ) -> Result<(), GestureError> {
        let progress = session.progress;
        match &self.profile {
            Profile::Toggle(_) => visuals.set_properties(
                proxy,
                &[
                    (Property::ScaleX, 1.0),
                    (Property::ScaleY, progress),
                    (Property::Opacity, lerp(TRANSPARENT, OPAQUE, progress)),
                ],
            ),
            Profile::WindowPinch(_) => {
                if progress <= 0.0 {
                    let shaped = session.shaped;
                    visuals.set_properties(
                        proxy,
                        &[
                            (Property::ScaleX, shaped),
                            (Property::ScaleY, shaped),
                            (Property::Opacity, lerp(TRANSPARENT, OPAQUE, shaped)),
                        ],
                    )
                } else if !session.snapshot.already_maximized {
                    let rect = session.snapshot.frame.lerp(&session.snapshot.maximized_box, progress);
                    visuals.set_properties(
                        proxy,
                        &[
                            (Property::ScaleX, 1.0),
                            (Property::ScaleY, 1.0),
                            (Property::Opacity, OPAQUE),
                            (Property::X, rect.x),
                            (Property::Y, rect.y),
                            (Property::Width, rect.width),
                            (Property::Height, rect.height),
                        ],
                    )
                } else {
                    visuals.set_properties(
                        proxy,
                        &[
                            (Property::ScaleX, 1.0),
                            (Property::ScaleY, 1.0),
                            (Property::Opacity, OPAQUE),
                        ],
                    )
                }
            }
            Profile::Launcher(_) => {
                let shaped = session.shaped;
                visuals.set_properties(
                    proxy,
                    &[
                        (Property::ScaleX, shaped),
                        (Property::ScaleY, shaped),
                        (Property::Opacity, lerp(TRANSPARENT, OPAQUE, shaped)),
                    ],
                )
            }
        }
    }
}

fn intent_of(snapshot: &Snapshot) -> Intent {
    if snapshot.open { Intent::Close } else { Intent::Open }
}
