//! Vertical swipe mapped directly onto the default sink's volume.
//!
//! The volume gesture has no animation and no commit-or-cancel decision;
//! every update is applied immediately and `end` only commits and shows the
//! OSD. The default sink can change underneath a running gesture, which is
//! handled through [`SinkCache`].

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::gesture::progress;
use crate::model::SinkCache;
use crate::sys::volume::VolumeService;

const ICONS: [&str; 5] = [
    "audio-volume-muted-symbolic",
    "audio-volume-low-symbolic",
    "audio-volume-medium-symbolic",
    "audio-volume-high-symbolic",
    "audio-volume-overamplified-symbolic",
];

#[derive(Debug, Clone, Copy)]
struct VolumeSession {
    generation: u64,
    max_volume: u32,
}

pub struct VolumeGesture {
    service: Arc<dyn VolumeService>,
    cache: Arc<SinkCache>,
    session: Option<VolumeSession>,
    last_percentage: Option<u32>,
}

impl VolumeGesture {
    pub fn new(service: Arc<dyn VolumeService>) -> Self {
        let cache = Arc::new(SinkCache::new(service.default_sink()));
        VolumeGesture {
            service,
            cache,
            session: None,
            last_percentage: None,
        }
    }

    pub fn cache(&self) -> Arc<SinkCache> { Arc::clone(&self.cache) }

    pub fn is_active(&self) -> bool { self.session.is_some() }

    /// Re-reads the default sink from the mixer.
    pub fn on_default_sink_changed(&self) {
        let sink = self.service.default_sink();
        let generation = self.cache.replace(sink.clone());
        debug!(generation, sink = ?sink.map(|s| s.id()), "default sink changed");
    }

    /// Starts a session. The slider maximum is read once per gesture since
    /// the user may toggle over-amplification between gestures.
    pub fn begin(&mut self) {
        let session = VolumeSession {
            generation: self.cache.generation(),
            max_volume: self.service.max_volume(),
        };
        trace!(?session, "volume gesture begin");
        self.session = Some(session);
    }

    /// Moves the volume by `delta / distance` of the full range. Swiping up
    /// (negative delta) raises it. Returns the volume written, or `None` if
    /// nothing was written.
    pub fn update(&mut self, delta: f64, distance: f64) -> Option<u32> {
        let session = self.session.as_mut()?;
        let step = match progress::normalize(delta, distance) {
            Ok(step) => step,
            Err(err) => {
                warn!(%err, "dropping volume update");
                return None;
            }
        };

        self.cache.with(|binding| {
            if binding.generation != session.generation {
                // This delta was measured against the previous sink; the new
                // one starts fresh from the next update.
                debug!(generation = binding.generation, "rebinding volume gesture to new sink");
                session.generation = binding.generation;
                return None;
            }
            let sink = binding.sink.as_ref()?;
            let max = f64::from(session.max_volume);
            let volume = (f64::from(sink.volume()) - (step * max).round()).clamp(0.0, max) as u32;
            sink.set_volume(volume);
            trace!(sink = sink.id(), volume, "volume update");
            Some(volume)
        })
    }

    /// Commits the volume and shows the OSD unless it would repeat the last
    /// one. Returns the percentage shown.
    pub fn end(&mut self) -> Option<u32> {
        self.session.take()?;
        let normal = self.service.normal_volume();
        let (volume, label) = self.cache.with(|binding| {
            let sink = binding.sink.as_ref()?;
            sink.commit();
            Some((sink.volume(), sink.port_label()))
        })?;

        let percentage = percentage(volume, normal);
        let previous = self.last_percentage.replace(percentage);
        let show = match previous {
            None | Some(0) => true,
            Some(previous) => percentage == 100 || previous != percentage,
        };
        if !show {
            trace!(percentage, "volume unchanged; skipping osd");
            return None;
        }
        let icon = volume_icon(volume, normal);
        self.service.show_osd(icon, &label, f64::from(percentage) / 100.0);
        Some(percentage)
    }
}

fn percentage(volume: u32, normal: u32) -> u32 {
    if normal == 0 {
        return 0;
    }
    (f64::from(volume) / f64::from(normal) * 100.0).round() as u32
}

/// Icon for `volume`: muted at zero, then low/medium/high by thirds of the
/// nominal range, over-amplified above it.
pub fn volume_icon(volume: u32, normal: u32) -> &'static str {
    if volume == 0 || normal == 0 {
        return ICONS[0];
    }
    let n = (3.0 * f64::from(volume) / f64::from(normal)).ceil() as usize;
    ICONS[n.clamp(1, ICONS.len() - 1)]
}
