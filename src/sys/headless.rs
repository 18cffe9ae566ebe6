//! A shell that exists only in the logs.
//!
//! Used for replays: every capability call is logged, transitions run on the
//! tokio clock and report completion back to the actor like the compositor
//! would.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::time::Instant;
use tracing::{debug, info};

use crate::actor::gestures::{Capabilities, Event, Sender};
use crate::animation::{BatchId, Property, PropertyTransition, TransitionTarget};
use crate::common::collections::{HashMap, HashSet};
use crate::gesture::{Feature, GestureError};
use crate::sys::geometry::Rect;
use crate::sys::keyboard::KeyInjector;
use crate::sys::keys::KeyChord;
use crate::sys::proxy::{ProxyId, VisualProxyHost};
use crate::sys::recognizer::{GestureRecognizer, Registration};
use crate::sys::volume::{Sink, VolumeService};
use crate::sys::window::{WindowControl, WindowId, WindowInfo};

const SCREEN: Rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);
const WORK_AREA: Rect = Rect::new(0.0, 32.0, 1920.0, 1048.0);
const NORMAL_VOLUME: u32 = 65536;

struct Proxy {
    values: HashMap<Property, f64>,
    visible: bool,
    running: Vec<PropertyTransition>,
    started: Instant,
}

impl Proxy {
    fn new() -> Self {
        Proxy {
            values: HashMap::default(),
            visible: false,
            running: Vec::new(),
            started: Instant::now(),
        }
    }

    fn sample(&self, transition: &PropertyTransition) -> f64 {
        if transition.duration.is_zero() {
            return transition.to;
        }
        let t = self.started.elapsed().as_secs_f64() / transition.duration.as_secs_f64();
        transition.sample(t)
    }

    fn value(&self, property: Property) -> f64 {
        match self.running.iter().find(|t| t.property == property) {
            Some(transition) => self.sample(transition),
            None => self.values.get(&property).copied().unwrap_or(match property {
                Property::Opacity => 255.0,
                Property::ScaleX | Property::ScaleY => 1.0,
                _ => 0.0,
            }),
        }
    }

    /// Stops every running transition where it currently is.
    fn freeze(&mut self) {
        let running = std::mem::take(&mut self.running);
        for transition in &running {
            let value = self.sample(transition);
            self.values.insert(transition.property, value);
        }
    }
}

pub struct HeadlessCompositor {
    events: Sender,
    proxies: HashMap<ProxyId, Proxy>,
    next_widget: u64,
}

impl HeadlessCompositor {
    pub fn new(events: Sender, proxies: impl IntoIterator<Item = ProxyId>) -> Self {
        HeadlessCompositor {
            events,
            proxies: proxies.into_iter().map(|p| (p, Proxy::new())).collect(),
            next_widget: 1000,
        }
    }
}

impl VisualProxyHost for HeadlessCompositor {
    fn property(&self, proxy: ProxyId, property: Property) -> Option<f64> {
        self.proxies.get(&proxy).map(|p| p.value(property))
    }

    fn set_property(
        &mut self,
        proxy: ProxyId,
        property: Property,
        value: f64,
    ) -> Result<(), GestureError> {
        let state = self.proxies.get_mut(&proxy).ok_or(GestureError::StaleProxy(proxy))?;
        state.freeze();
        state.values.insert(property, value);
        Ok(())
    }

    fn set_visible(&mut self, proxy: ProxyId, visible: bool) -> Result<(), GestureError> {
        let state = self.proxies.get_mut(&proxy).ok_or(GestureError::StaleProxy(proxy))?;
        if state.visible != visible {
            debug!(?proxy, visible, "visibility");
        }
        state.visible = visible;
        Ok(())
    }

    fn current_transition(&self, proxy: ProxyId, property: Property) -> Option<PropertyTransition> {
        self.proxies.get(&proxy)?.running.iter().find(|t| t.property == property).copied()
    }

    fn animate_to(
        &mut self,
        proxy: ProxyId,
        target: &TransitionTarget,
        batch: BatchId,
    ) -> Result<(), GestureError> {
        let state = self.proxies.get_mut(&proxy).ok_or(GestureError::StaleProxy(proxy))?;
        state.freeze();
        state.running = target.properties.clone();
        state.started = Instant::now();
        info!(?proxy, ?batch, duration = ?target.duration(), "animate");

        let events = self.events.clone();
        let duration = target.duration();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            events.send(Event::TransitionsCompleted { proxy, batch });
        });
        Ok(())
    }

    fn create_widget(&mut self, style_class: &str) -> ProxyId {
        self.next_widget += 1;
        let proxy = ProxyId(self.next_widget);
        self.proxies.insert(proxy, Proxy::new());
        debug!(?proxy, style_class, "created widget");
        proxy
    }

    fn destroy(&mut self, proxy: ProxyId) {
        if self.proxies.remove(&proxy).is_some() {
            self.events.send(Event::ProxyDestroyed(proxy));
        }
    }
}

#[derive(Debug, Default)]
struct WindowState {
    focused: Option<WindowId>,
    windows: HashMap<WindowId, (WindowInfo, Rect)>,
    maximized: HashSet<WindowId>,
    closed: Vec<WindowId>,
}

/// Window manager with a fixed set of windows. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct HeadlessWindows(Rc<RefCell<WindowState>>);

impl HeadlessWindows {
    pub fn new(windows: impl IntoIterator<Item = (WindowInfo, Rect)>) -> Self {
        let windows: HashMap<_, _> = windows.into_iter().map(|(w, r)| (w.id, (w, r))).collect();
        let focused = windows.keys().min_by_key(|w| w.0).copied();
        HeadlessWindows(Rc::new(RefCell::new(WindowState {
            focused,
            windows,
            ..WindowState::default()
        })))
    }

    pub fn closed(&self) -> Vec<WindowId> { self.0.borrow().closed.clone() }
}

impl WindowControl for HeadlessWindows {
    fn focused_window(&self) -> Option<WindowInfo> {
        let state = self.0.borrow();
        state.focused.and_then(|id| state.windows.get(&id)).map(|(w, _)| w.clone())
    }

    fn frame_rect(&self, window: WindowId) -> Option<Rect> {
        self.0.borrow().windows.get(&window).map(|(_, r)| *r)
    }

    fn is_maximized(&self, window: WindowId) -> bool { self.0.borrow().maximized.contains(&window) }

    fn is_fullscreen(&self, _window: WindowId) -> bool { false }

    fn work_area(&self, _monitor: usize) -> Rect { WORK_AREA }

    fn screen_rect(&self) -> Rect { SCREEN }

    fn maximize(&mut self, window: WindowId) {
        info!(?window, "maximize");
        self.0.borrow_mut().maximized.insert(window);
    }

    fn unmaximize(&mut self, window: WindowId) {
        info!(?window, "unmaximize");
        self.0.borrow_mut().maximized.remove(&window);
    }

    fn request_close(&mut self, window: WindowId) {
        info!(?window, "close");
        let mut state = self.0.borrow_mut();
        state.windows.remove(&window);
        state.closed.push(window);
        if state.focused == Some(window) {
            state.focused = None;
        }
    }
}

pub struct HeadlessKeyboard;

impl KeyInjector for HeadlessKeyboard {
    fn send_key_chord(&mut self, chord: &KeyChord) {
        info!(%chord, "key chord");
    }
}

pub struct HeadlessRecognizer;

impl GestureRecognizer for HeadlessRecognizer {
    fn register(&mut self, registration: &Registration) {
        debug!(?registration, "recognizer registration");
    }

    fn is_allowed(&self, _feature: Feature) -> bool { true }
}

#[derive(Debug)]
pub struct HeadlessSink(AtomicU32);

impl Sink for HeadlessSink {
    fn id(&self) -> u32 { 0 }

    fn volume(&self) -> u32 { self.0.load(Ordering::Relaxed) }

    fn set_volume(&self, volume: u32) { self.0.store(volume, Ordering::Relaxed) }

    fn commit(&self) {
        info!(volume = self.volume(), "commit volume");
    }

    fn port_label(&self) -> String { "Headless output".to_string() }
}

pub struct HeadlessMixer {
    sink: Arc<HeadlessSink>,
}

impl HeadlessMixer {
    pub fn new() -> Arc<Self> {
        Arc::new(HeadlessMixer {
            sink: Arc::new(HeadlessSink(AtomicU32::new(NORMAL_VOLUME / 2))),
        })
    }
}

impl VolumeService for HeadlessMixer {
    fn default_sink(&self) -> Option<Arc<dyn Sink>> { Some(self.sink.clone()) }

    fn max_volume(&self) -> u32 { NORMAL_VOLUME }

    fn normal_volume(&self) -> u32 { NORMAL_VOLUME }

    fn show_osd(&self, icon: &str, label: &str, fraction: f64) {
        info!(icon, label, fraction, "osd");
    }
}

/// A desktop with one focused window (id 1, drawn by proxy 1) and a mixer.
pub fn capabilities(events: Sender) -> (Capabilities, HeadlessWindows) {
    let window = WindowInfo {
        id: WindowId(1),
        app_id: Some("org.gnome.TextEditor".to_string()),
        proxy: Some(ProxyId(1)),
        monitor: 0,
    };
    let windows = HeadlessWindows::new([(window, Rect::new(100.0, 100.0, 800.0, 600.0))]);
    let caps = Capabilities {
        visuals: Box::new(HeadlessCompositor::new(events, [ProxyId(1)])),
        windows: Box::new(windows.clone()),
        keyboard: Box::new(HeadlessKeyboard),
        recognizer: Box::new(HeadlessRecognizer),
        mixer: Some(HeadlessMixer::new()),
    };
    (caps, windows)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::actor::gestures::replay::{self, Record};
    use crate::actor::gestures::{self, GestureActor};
    use crate::common::config::Config;
    use crate::gesture::PinchState;

    fn record(after_ms: u64, event: Event) -> Record { Record { after_ms, event } }

    #[tokio::test(start_paused = true)]
    async fn transitions_sample_on_the_clock() {
        let (tx, mut rx) = gestures::channel();
        let mut host = HeadlessCompositor::new(tx, [ProxyId(1)]);
        host.set_property(ProxyId(1), Property::Opacity, 0.0).unwrap();
        let target = TransitionTarget {
            properties: vec![PropertyTransition {
                property: Property::Opacity,
                from: 0.0,
                to: 200.0,
                duration: Duration::from_millis(100),
                easing: crate::animation::Easing::Linear,
            }],
        };
        host.animate_to(ProxyId(1), &target, BatchId(4)).unwrap();

        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(host.property(ProxyId(1), Property::Opacity), Some(100.0));

        let (_, event) = rx.recv().await.unwrap();
        assert_eq!(event, Event::TransitionsCompleted { proxy: ProxyId(1), batch: BatchId(4) });
        assert_eq!(host.property(ProxyId(1), Property::Opacity), Some(200.0));
    }

    #[tokio::test(start_paused = true)]
    async fn replayed_pinch_closes_the_window() {
        let (tx, rx) = gestures::channel();
        let (caps, windows) = capabilities(tx.clone());
        let actor = GestureActor::new(&Config::default(), caps).unwrap();

        let feature = Feature::WindowManipulation;
        let records = vec![
            record(0, Event::GestureBegin { feature }),
            record(16, Event::GestureUpdate { feature, delta: -90.0, distance: 100.0 }),
            record(16, Event::GestureEnd {
                feature,
                duration_ms: 250,
                final_state: Some(PinchState::PinchIn),
            }),
        ];
        tokio::join!(actor.run(rx), replay::feed(records, tx));

        assert_eq!(windows.closed(), vec![WindowId(1)]);
    }
}
