use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animation::Easing;
use crate::sys::geometry::{Rect, lerp};

/// Animatable properties of a visual proxy.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Property {
    X,
    Y,
    Width,
    Height,
    /// 0 to 255.
    Opacity,
    ScaleX,
    ScaleY,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PropertyTransition {
    pub property: Property,
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
    pub easing: Easing,
}

impl PropertyTransition {
    /// Value at linear time fraction `t`.
    pub fn sample(&self, t: f64) -> f64 { lerp(self.from, self.to, self.easing.apply(t)) }
}

/// A batch of property transitions that complete together.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransitionTarget {
    pub properties: Vec<PropertyTransition>,
}

impl TransitionTarget {
    pub fn get(&self, property: Property) -> Option<&PropertyTransition> {
        self.properties.iter().find(|t| t.property == property)
    }

    pub fn duration(&self) -> Duration {
        self.properties.iter().map(|t| t.duration).max().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool { self.properties.is_empty() }
}

/// Target values an outcome asks for. Starting values are filled in from the
/// proxy's live state when the request is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    pub duration: Duration,
    pub easing: Easing,
    pub targets: Vec<(Property, f64)>,
}

impl TransitionRequest {
    pub fn new(duration: Duration, easing: Easing) -> Self {
        TransitionRequest { duration, easing, targets: Vec::new() }
    }

    pub fn with(mut self, property: Property, value: f64) -> Self {
        match self.targets.iter_mut().find(|(p, _)| *p == property) {
            Some(entry) => entry.1 = value,
            None => self.targets.push((property, value)),
        }
        self
    }

    pub fn with_opacity(self, opacity: f64) -> Self { self.with(Property::Opacity, opacity) }

    pub fn with_scale(self, scale: f64) -> Self {
        self.with(Property::ScaleX, scale).with(Property::ScaleY, scale)
    }

    pub fn with_rect(self, rect: Rect) -> Self {
        self.with(Property::X, rect.x)
            .with(Property::Y, rect.y)
            .with(Property::Width, rect.width)
            .with(Property::Height, rect.height)
    }

    pub fn target(&self, property: Property) -> Option<f64> {
        self.targets.iter().find(|(p, _)| *p == property).map(|(_, v)| *v)
    }
}

/// Where a proxy is put once its batch finishes, whatever the outcome.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RestState {
    pub properties: Vec<(Property, f64)>,
    pub hide: bool,
}

impl RestState {
    pub fn is_empty(&self) -> bool { self.properties.is_empty() && !self.hide }
}
