//! Mask Engine: one alpha buffer per image layer, written by brush strokes, chroma keying and
//! ingested segmentation alpha. Every technique after the first restricts the existing mask.

pub mod brush;
pub mod buffer;
pub mod chroma;
pub mod segment;

pub use brush::{BrushEditor, BrushMode, BrushState};
pub use buffer::AlphaMask;
pub use chroma::{ChromaKeyer, ChromaParams, KeyReference};
pub use segment::{SegmentationCurve, SegmentationRequest, SegmentationState, Segmenter};
