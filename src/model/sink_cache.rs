use std::sync::Arc;

use parking_lot::RwLock;

use crate::sys::volume::Sink;

/// The default sink as of some point in time. `generation` increases on every
/// replacement.
#[derive(Debug, Default, Clone)]
pub struct SinkBinding {
    pub generation: u64,
    pub sink: Option<Arc<dyn Sink>>,
}

/// Shared slot holding the current default sink.
///
/// The mixer may report a new default sink from its own thread. Replacement
/// takes the write lock, so it can never interleave with a volume change
/// running under [`SinkCache::with`].
#[derive(Debug, Default)]
pub struct SinkCache(RwLock<SinkBinding>);

impl SinkCache {
    pub fn new(sink: Option<Arc<dyn Sink>>) -> Self {
        SinkCache(RwLock::new(SinkBinding { generation: 0, sink }))
    }

    pub fn load(&self) -> SinkBinding { self.0.read().clone() }

    pub fn generation(&self) -> u64 { self.0.read().generation }

    /// Installs `sink` and returns the new generation.
    pub fn replace(&self, sink: Option<Arc<dyn Sink>>) -> u64 {
        let mut binding = self.0.write();
        binding.generation += 1;
        binding.sink = sink;
        binding.generation
    }

    /// Runs `f` against the current binding; replacements wait until it
    /// returns.
    pub fn with<R>(&self, f: impl FnOnce(&SinkBinding) -> R) -> R { f(&self.0.read()) }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::actor::gestures::testing::TestSink;

    #[test]
    fn replace_bumps_generation() {
        let cache = SinkCache::new(Some(TestSink::new(1, 100)));
        assert_eq!(cache.generation(), 0);
        assert_eq!(cache.replace(Some(TestSink::new(2, 100))), 1);
        assert_eq!(cache.load().sink.unwrap().id(), 2);
        assert_eq!(cache.replace(None), 2);
        assert!(cache.load().sink.is_none());
    }

    #[test]
    fn writes_never_straddle_a_swap() {
        let first = TestSink::new(1, 0);
        let cache = Arc::new(SinkCache::new(Some(first.clone())));

        let swapper = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for id in 2..200 {
                    cache.replace(Some(TestSink::new(id, 0)));
                }
            })
        };

        // Each write is tagged with the generation it was computed against;
        // the sink it lands on must still belong to that generation.
        for _ in 0..2000 {
            cache.with(|binding| {
                let sink = binding.sink.as_ref().unwrap();
                assert_eq!(sink.id(), binding.generation as u32 + 1);
                sink.set_volume(binding.generation as u32);
            });
        }
        swapper.join().unwrap();
        assert_eq!(cache.generation(), 198);
    }
}
