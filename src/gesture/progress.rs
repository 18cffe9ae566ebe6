use crate::gesture::GestureError;

/// Integrates normalized deltas into a bounded progress value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProgressAccumulator {
    lower: f64,
    upper: f64,
}

impl ProgressAccumulator {
    /// Bounds of a one-way swipe.
    pub const SWIPE: ProgressAccumulator = ProgressAccumulator { lower: 0.0, upper: 1.0 };
    /// Bounds of a three-way pinch, DEFAULT sitting at 0.
    pub const PINCH: ProgressAccumulator = ProgressAccumulator { lower: -1.0, upper: 1.0 };

    pub fn new(lower: f64, upper: f64) -> Result<Self, GestureError> {
        if !(lower.is_finite() && upper.is_finite()) || lower >= upper {
            return Err(GestureError::Configuration(format!(
                "progress bounds must satisfy lower < upper, got [{lower}, {upper}]"
            )));
        }
        Ok(ProgressAccumulator { lower, upper })
    }

    pub fn lower(&self) -> f64 { self.lower }

    pub fn upper(&self) -> f64 { self.upper }

    pub fn clamp(&self, progress: f64) -> f64 { progress.clamp(self.lower, self.upper) }

    /// `clamp(current + delta / distance, lower, upper)`.
    ///
    /// `distance` is the recognizer's device normalization and must be a
    /// positive finite number.
    pub fn advance(&self, current: f64, delta: f64, distance: f64) -> Result<f64, GestureError> {
        Ok(self.clamp(current + normalize(delta, distance)?))
    }
}

/// `delta / distance`, rejecting a distance that cannot normalize anything.
pub fn normalize(delta: f64, distance: f64) -> Result<f64, GestureError> {
    if !(distance.is_finite() && distance > 0.0) {
        return Err(GestureError::Configuration(format!(
            "gesture distance must be positive, got {distance}"
        )));
    }
    if !delta.is_finite() {
        return Err(GestureError::Configuration(format!("non-finite gesture delta {delta}")));
    }
    Ok(delta / distance)
}
