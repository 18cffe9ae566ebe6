use serde::{Deserialize, Serialize};

/// Linear interpolation between `from` and `to`. `t` is not clamped.
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 { from + (to - from) * t }

#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }

    pub fn center(&self) -> (f64, f64) { (self.x + self.width / 2.0, self.y + self.height / 2.0) }

    /// Interpolates every edge independently.
    pub fn lerp(&self, to: &Rect, t: f64) -> Rect {
        Rect {
            x: lerp(self.x, to.x, t),
            y: lerp(self.y, to.y, t),
            width: lerp(self.width, to.width, t),
            height: lerp(self.height, to.height, t),
        }
    }

    /// Shrinks the rect vertically by `fraction` of its height on both the
    /// top and the bottom edge. The inset is rounded to whole pixels.
    pub fn inset_vertical(&self, fraction: f64) -> Rect {
        let inset = (self.height * fraction).round();
        Rect {
            x: self.x,
            y: self.y + inset,
            width: self.width,
            height: self.height - 2.0 * inset,
        }
    }

    /// A rect of `width`×`height` centered inside `self`.
    pub fn centered(&self, width: f64, height: f64) -> Rect {
        let (cx, cy) = self.center();
        Rect::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }
}
