use serde::{Deserialize, Serialize};

use crate::animation::{BatchId, Property, PropertyTransition, TransitionTarget};
use crate::gesture::GestureError;

/// Handle to a compositor-owned actor.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ProxyId(pub u64);

/// The compositor side of a visual proxy.
///
/// Calls against a proxy the compositor already destroyed return
/// [`GestureError::StaleProxy`].
pub trait VisualProxyHost {
    /// Live value, mid-transition if one is running. `None` if the proxy is
    /// gone.
    fn property(&self, proxy: ProxyId, property: Property) -> Option<f64>;

    fn set_property(
        &mut self,
        proxy: ProxyId,
        property: Property,
        value: f64,
    ) -> Result<(), GestureError>;

    fn set_visible(&mut self, proxy: ProxyId, visible: bool) -> Result<(), GestureError>;

    fn current_transition(&self, proxy: ProxyId, property: Property) -> Option<PropertyTransition>;

    /// Starts (or retargets) every transition in `target`. Once all of them
    /// finish the host reports `batch` exactly once through
    /// `Event::TransitionsCompleted`. A batch replaced by a later call may or
    /// may not be reported.
    fn animate_to(
        &mut self,
        proxy: ProxyId,
        target: &TransitionTarget,
        batch: BatchId,
    ) -> Result<(), GestureError>;

    /// Creates a hidden, non-reactive widget on the UI layer.
    fn create_widget(&mut self, style_class: &str) -> ProxyId;

    fn destroy(&mut self, proxy: ProxyId);

    fn set_properties(
        &mut self,
        proxy: ProxyId,
        values: &[(Property, f64)],
    ) -> Result<(), GestureError> {
        for &(property, value) in values {
            self.set_property(proxy, property, value)?;
        }
        Ok(())
    }
}
