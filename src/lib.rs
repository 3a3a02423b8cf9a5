//! Lamina is an interactive multi-layer image compositor.
//!
//! Everything goes through a [`CompositionSession`]:
//!
//! - Add image and text layers, arrange and transform them
//! - Mask images with brush strokes, chroma keying or external segmentation
//! - Render the live composite, export stills, merge layers
//! - Synthesize parallax loops into a [`FrameSink`]
#![forbid(unsafe_code)]

pub mod adjust;
pub mod animate;
pub mod encode;
pub mod foundation;
pub mod interact;
pub mod layer;
pub mod mask;
pub mod project;
pub mod raster;
pub mod render;
pub mod session;
pub mod text;

pub use crate::foundation::core::{Affine, Canvas, LayerId, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{LaminaError, LaminaResult};

pub use crate::adjust::{AdjustParams, RetroStyle};
pub use crate::animate::{LoopMode, MotionType, ParallaxOpts, Progress, Stage};
pub use crate::encode::{FrameSink, GifSink, InMemorySink, QualityPreset, SinkConfig};
pub use crate::interact::{GestureState, PointerId};
pub use crate::layer::{AspectPreset, CanvasState, Geometry, Layer, LayerContent, LayerKind};
pub use crate::mask::{BrushMode, ChromaParams, KeyReference, SegmentationRequest, Segmenter};
pub use crate::project::ProjectDef;
pub use crate::session::{CompositionSession, SessionOpts};
pub use crate::text::{FontFamily, TextAlign, TextStyle};
