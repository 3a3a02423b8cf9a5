//! Parallax Animation Engine.

pub mod parallax;

pub use parallax::{
    LoopMode, MotionType, ParallaxOpts, Progress, Stage, layer_motion, preview_frame, progress_at,
    synthesize,
};
