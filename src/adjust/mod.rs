//! Per-layer color and filter adjustments.

pub mod color;
pub mod memo;
pub mod params;
pub mod pipeline;

pub use params::{AdjustParams, RetroStyle};
pub use pipeline::apply_adjustments;
