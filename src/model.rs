pub mod sink_cache;

pub use sink_cache::{SinkBinding, SinkCache};
