//! Encoder boundary for synthesized frame sequences.

pub mod gif;
pub mod sink;

pub use gif::GifSink;
pub use sink::{FrameSink, InMemorySink, QualityPreset, SinkConfig};
