use serde::{Deserialize, Serialize};

use crate::sys::geometry::Rect;
use crate::sys::proxy::ProxyId;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

/// What the window manager reports about a window when asked.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WindowInfo {
    pub id: WindowId,
    /// GTK application id, if the window has one.
    pub app_id: Option<String>,
    /// The compositor actor drawing this window.
    pub proxy: Option<ProxyId>,
    pub monitor: usize,
}

pub trait WindowControl {
    fn focused_window(&self) -> Option<WindowInfo>;
    fn frame_rect(&self, window: WindowId) -> Option<Rect>;
    fn is_maximized(&self, window: WindowId) -> bool;
    fn is_fullscreen(&self, window: WindowId) -> bool;
    fn work_area(&self, monitor: usize) -> Rect;
    /// The full stage, spanning every monitor.
    fn screen_rect(&self) -> Rect;

    fn maximize(&mut self, window: WindowId);
    fn unmaximize(&mut self, window: WindowId);
    fn request_close(&mut self, window: WindowId);
}
