//! Raster helpers shared by the adjustment pipeline, mask engine and compositor.

pub mod blur;
pub mod composite;
pub mod decode;
