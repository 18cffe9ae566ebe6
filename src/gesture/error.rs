use thiserror::Error;

use crate::gesture::Feature;
use crate::sys::proxy::ProxyId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GestureError {
    /// The gesture started with nothing focused. Not surfaced to the user.
    #[error("No focused window")]
    NoFocusedWindow,
    /// Invalid settings, or recognizer input that cannot be normalized.
    #[error("Invalid gesture configuration: {0}")]
    Configuration(String),
    /// The compositor destroyed the proxy under us.
    #[error("Visual proxy {0:?} no longer exists")]
    StaleProxy(ProxyId),
    #[error("Gesture for {0} vetoed by the recognizer")]
    VetoedGesture(Feature),
}
