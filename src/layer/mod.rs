//! Layer model, Layer Store and canvas state.

pub mod canvas;
pub mod model;
pub mod store;

pub use canvas::{AspectPreset, CanvasState};
pub use model::{
    Geometry, ImageLayer, Layer, LayerContent, LayerKind, LayerProps, MAX_SCALE, MIN_SCALE,
    TextLayer,
};
pub use store::LayerStore;
