//! Text Layout Engine: measurement, greedy wrapping and rotation-aware auto-fit.

pub mod engine;
pub mod fit;
pub mod fonts;
pub mod layout;
pub mod measure;
pub mod style;

pub use engine::{TextBrush, TextEngine};
pub use fit::{FittedText, auto_fit, rotated_extent};
pub use fonts::FontFamily;
pub use layout::{LaidLine, TextLayout, wrap_text};
pub use measure::{ApproxMeasure, TextMeasure};
pub use style::{TextAlign, TextStyle};
