//! Recording fakes of every capability, shared by the unit tests.
//!
//! The fakes hand out clones sharing one state, so a test can keep a handle
//! while the actor owns a boxed copy.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use parking_lot::Mutex;

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

/// Externally visible effects, in the order they happened. Plain property
/// writes are not recorded; inspect them through [`TestCompositor`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Keys(KeyChord),
    RequestClose(WindowId),
    Unmaximize(WindowId),
    Maximize(WindowId),
    Animate {
        proxy: ProxyId,
        target: TransitionTarget,
        batch: BatchId,
    },
    CreateWidget(ProxyId),
    Register(Registration),
}

#[derive(Debug, Clone, Default)]
pub struct Recorder(Rc<RefCell<Vec<Call>>>);

impl Recorder {
    pub fn new() -> Self { Self::default() }

    pub fn push(&self, call: Call) { self.0.borrow_mut().push(call) }

    pub fn calls(&self) -> Vec<Call> { self.0.borrow().clone() }

    pub fn clear(&self) { self.0.borrow_mut().clear() }

    /// Only the calls that are outcome actions (keys, close, maximize, ...).
    pub fn actions(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::Keys(_) | Call::RequestClose(_) | Call::Unmaximize(_) | Call::Maximize(_)
                )
            })
            .collect()
    }

    pub fn last_animation(&self, proxy: ProxyId) -> Option<TransitionTarget> {
        self.0.borrow().iter().rev().find_map(|c| match c {
            Call::Animate { proxy: p, target, .. } if *p == proxy => Some(target.clone()),
            _ => None,
        })
    }

    pub fn last_batch(&self, proxy: ProxyId) -> Option<BatchId> {
        self.0.borrow().iter().rev().find_map(|c| match c {
            Call::Animate { proxy: p, batch, .. } if *p == proxy => Some(*batch),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
struct ProxyState {
    values: HashMap<Property, f64>,
    visible: bool,
    running: Vec<PropertyTransition>,
    batch: Option<BatchId>,
}

impl Default for ProxyState {
    fn default() -> Self {
        let values = [
            (Property::X, 0.0),
            (Property::Y, 0.0),
            (Property::Width, 0.0),
            (Property::Height, 0.0),
            (Property::Opacity, 255.0),
            (Property::ScaleX, 1.0),
            (Property::ScaleY, 1.0),
        ];
        ProxyState {
            values: values.into_iter().collect(),
            visible: false,
            running: Vec::new(),
            batch: None,
        }
    }
}

/// A compositor whose transitions only move when the test says so.
#[derive(Debug, Clone)]
pub struct TestCompositor {
    recorder: Recorder,
    proxies: Rc<RefCell<HashMap<ProxyId, ProxyState>>>,
    next_widget: Rc<RefCell<u64>>,
}

impl TestCompositor {
    pub fn new(recorder: &Recorder) -> Self {
        TestCompositor {
            recorder: recorder.clone(),
            proxies: Rc::default(),
            next_widget: Rc::new(RefCell::new(1000)),
        }
    }

    pub fn add_proxy(&self, proxy: ProxyId) {
        self.proxies.borrow_mut().insert(proxy, ProxyState::default());
    }

    pub fn is_visible(&self, proxy: ProxyId) -> bool {
        self.proxies.borrow().get(&proxy).is_some_and(|p| p.visible)
    }

    pub fn is_animating(&self, proxy: ProxyId) -> bool {
        self.proxies.borrow().get(&proxy).is_some_and(|p| !p.running.is_empty())
    }

    /// Moves every running transition on `proxy` to fraction `t` of its
    /// duration.
    pub fn advance(&self, proxy: ProxyId, t: f64) {
        let mut proxies = self.proxies.borrow_mut();
        let Some(state) = proxies.get_mut(&proxy) else { return };
        for transition in &state.running {
            state.values.insert(transition.property, transition.sample(t));
        }
    }

    /// Runs the current batch on `proxy` to the end and returns its id, the
    /// way the real compositor would report it.
    pub fn finish(&self, proxy: ProxyId) -> Option<BatchId> {
        self.advance(proxy, 1.0);
        let mut proxies = self.proxies.borrow_mut();
        let state = proxies.get_mut(&proxy)?;
        state.running.clear();
        state.batch.take()
    }

    /// The compositor destroying the actor on its own, e.g. a window that
    /// finished closing.
    pub fn remove(&self, proxy: ProxyId) { self.proxies.borrow_mut().remove(&proxy); }
}

impl VisualProxyHost for TestCompositor {
    fn property(&self, proxy: ProxyId, property: Property) -> Option<f64> {
        self.proxies.borrow().get(&proxy).and_then(|p| p.values.get(&property).copied())
    }

    fn set_property(
        &mut self,
        proxy: ProxyId,
        property: Property,
        value: f64,
    ) -> Result<(), GestureError> {
        let mut proxies = self.proxies.borrow_mut();
        let state = proxies.get_mut(&proxy).ok_or(GestureError::StaleProxy(proxy))?;
        state.running.retain(|t| t.property != property);
        state.values.insert(property, value);
        Ok(())
    }

    fn set_visible(&mut self, proxy: ProxyId, visible: bool) -> Result<(), GestureError> {
        let mut proxies = self.proxies.borrow_mut();
        let state = proxies.get_mut(&proxy).ok_or(GestureError::StaleProxy(proxy))?;
        state.visible = visible;
        Ok(())
    }

    fn current_transition(&self, proxy: ProxyId, property: Property) -> Option<PropertyTransition> {
        let proxies = self.proxies.borrow();
        proxies.get(&proxy)?.running.iter().find(|t| t.property == property).copied()
    }

    fn animate_to(
        &mut self,
        proxy: ProxyId,
        target: &TransitionTarget,
        batch: BatchId,
    ) -> Result<(), GestureError> {
        let mut proxies = self.proxies.borrow_mut();
        let state = proxies.get_mut(&proxy).ok_or(GestureError::StaleProxy(proxy))?;
        state.running = target.properties.clone();
        state.batch = Some(batch);
        self.recorder.push(Call::Animate {
            proxy,
            target: target.clone(),
            batch,
        });
        Ok(())
    }

    fn create_widget(&mut self, _style_class: &str) -> ProxyId {
        let proxy = {
            let mut next = self.next_widget.borrow_mut();
            *next += 1;
            ProxyId(*next)
        };
        self.add_proxy(proxy);
        self.recorder.push(Call::CreateWidget(proxy));
        proxy
    }

    fn destroy(&mut self, proxy: ProxyId) { self.remove(proxy) }
}

#[derive(Debug, Clone)]
struct WindowState {
    focused: Option<WindowId>,
    windows: HashMap<WindowId, (WindowInfo, Rect)>,
    maximized: HashSet<WindowId>,
    fullscreen: HashSet<WindowId>,
    work_area: Rect,
    screen: Rect,
}

#[derive(Debug, Clone)]
pub struct TestWindows {
    recorder: Recorder,
    state: Rc<RefCell<WindowState>>,
}

impl TestWindows {
    pub fn new(recorder: &Recorder) -> Self {
        TestWindows {
            recorder: recorder.clone(),
            state: Rc::new(RefCell::new(WindowState {
                focused: None,
                windows: HashMap::default(),
                maximized: HashSet::default(),
                fullscreen: HashSet::default(),
                work_area: Rect::new(0.0, 32.0, 1920.0, 1048.0),
                screen: Rect::new(0.0, 0.0, 1920.0, 1080.0),
            })),
        }
    }

    /// Adds a window and focuses it.
    pub fn open(&self, info: WindowInfo, frame: Rect) {
        let mut state = self.state.borrow_mut();
        state.focused = Some(info.id);
        state.windows.insert(info.id, (info, frame));
    }

    pub fn focus(&self, window: Option<WindowId>) { self.state.borrow_mut().focused = window; }

    pub fn set_maximized(&self, window: WindowId, maximized: bool) {
        let mut state = self.state.borrow_mut();
        if maximized {
            state.maximized.insert(window);
        } else {
            state.maximized.remove(&window);
        }
    }

    pub fn set_fullscreen(&self, window: WindowId) {
        self.state.borrow_mut().fullscreen.insert(window);
    }
}

impl WindowControl for TestWindows {
    fn focused_window(&self) -> Option<WindowInfo> {
        let state = self.state.borrow();
        state.focused.and_then(|id| state.windows.get(&id)).map(|(info, _)| info.clone())
    }

    fn frame_rect(&self, window: WindowId) -> Option<Rect> {
        self.state.borrow().windows.get(&window).map(|(_, frame)| *frame)
    }

    fn is_maximized(&self, window: WindowId) -> bool {
        self.state.borrow().maximized.contains(&window)
    }

    fn is_fullscreen(&self, window: WindowId) -> bool {
        self.state.borrow().fullscreen.contains(&window)
    }

    fn work_area(&self, _monitor: usize) -> Rect { self.state.borrow().work_area }

    fn screen_rect(&self) -> Rect { self.state.borrow().screen }

    fn maximize(&mut self, window: WindowId) {
        self.set_maximized(window, true);
        self.recorder.push(Call::Maximize(window));
    }

    fn unmaximize(&mut self, window: WindowId) {
        self.set_maximized(window, false);
        self.recorder.push(Call::Unmaximize(window));
    }

    fn request_close(&mut self, window: WindowId) {
        self.recorder.push(Call::RequestClose(window));
    }
}

#[derive(Debug, Clone)]
pub struct TestKeyboard {
    recorder: Recorder,
}

impl TestKeyboard {
    pub fn new(recorder: &Recorder) -> Self { TestKeyboard { recorder: recorder.clone() } }
}

impl KeyInjector for TestKeyboard {
    fn send_key_chord(&mut self, chord: &KeyChord) {
        self.recorder.push(Call::Keys(chord.clone()));
    }
}

#[derive(Debug, Clone)]
pub struct TestRecognizer {
    recorder: Recorder,
    vetoed: Rc<RefCell<HashSet<Feature>>>,
}

impl TestRecognizer {
    pub fn new(recorder: &Recorder) -> Self {
        TestRecognizer {
            recorder: recorder.clone(),
            vetoed: Rc::default(),
        }
    }

    pub fn veto(&self, feature: Feature, vetoed: bool) {
        let mut set = self.vetoed.borrow_mut();
        if vetoed {
            set.insert(feature);
        } else {
            set.remove(&feature);
        }
    }
}

impl GestureRecognizer for TestRecognizer {
    fn register(&mut self, registration: &Registration) {
        self.recorder.push(Call::Register(registration.clone()));
    }

    fn is_allowed(&self, feature: Feature) -> bool { !self.vetoed.borrow().contains(&feature) }
}

#[derive(Debug)]
pub struct TestSink {
    id: u32,
    volume: AtomicU32,
    commits: AtomicUsize,
}

impl TestSink {
    pub fn new(id: u32, volume: u32) -> Arc<TestSink> {
        Arc::new(TestSink {
            id,
            volume: AtomicU32::new(volume),
            commits: AtomicUsize::new(0),
        })
    }

    pub fn commits(&self) -> usize { self.commits.load(Ordering::SeqCst) }
}

impl Sink for TestSink {
    fn id(&self) -> u32 { self.id }

    fn volume(&self) -> u32 { self.volume.load(Ordering::SeqCst) }

    fn set_volume(&self, volume: u32) { self.volume.store(volume, Ordering::SeqCst) }

    fn commit(&self) { self.commits.fetch_add(1, Ordering::SeqCst); }

    fn port_label(&self) -> String { "Speakers".to_string() }
}

pub struct TestMixer {
    default: Mutex<Option<Arc<dyn Sink>>>,
    max_volume: u32,
    normal_volume: u32,
    osd: Mutex<Vec<(String, String, f64)>>,
}

impl TestMixer {
    pub fn new(default: Option<Arc<dyn Sink>>, max_volume: u32, normal_volume: u32) -> Arc<Self> {
        Arc::new(TestMixer {
            default: Mutex::new(default),
            max_volume,
            normal_volume,
            osd: Mutex::new(Vec::new()),
        })
    }

    pub fn set_default(&self, sink: Option<Arc<dyn Sink>>) { *self.default.lock() = sink; }

    /// `(icon, label, fraction)` of every OSD shown.
    pub fn osd_calls(&self) -> Vec<(String, String, f64)> { self.osd.lock().clone() }
}

impl VolumeService for TestMixer {
    fn default_sink(&self) -> Option<Arc<dyn Sink>> { self.default.lock().clone() }

    fn max_volume(&self) -> u32 { self.max_volume }

    fn normal_volume(&self) -> u32 { self.normal_volume }

    fn show_osd(&self, icon: &str, label: &str, fraction: f64) {
        self.osd.lock().push((icon.to_string(), label.to_string(), fraction));
    }
}
