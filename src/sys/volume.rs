use std::fmt::Debug;
use std::sync::Arc;

/// An audio output stream owned by the mixer.
///
/// Sinks are shared with the mixer's own notification thread, so every method
/// takes `&self`.
pub trait Sink: Debug + Send + Sync {
    fn id(&self) -> u32;
    fn volume(&self) -> u32;
    fn set_volume(&self, volume: u32);
    /// Pushes the locally set volume to the sound server.
    fn commit(&self);
    /// Human readable name of the active port, shown in the OSD.
    fn port_label(&self) -> String;
}

pub trait VolumeService: Send + Sync {
    fn default_sink(&self) -> Option<Arc<dyn Sink>>;
    /// Largest volume the slider allows, in sink units (may exceed 100%).
    fn max_volume(&self) -> u32;
    /// Nominal 100% volume in sink units.
    fn normal_volume(&self) -> u32;
    fn show_osd(&self, icon: &str, label: &str, fraction: f64);
}
