use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{LaminaError, LaminaResult};

/// Aspect-ratio presets with their base pixel dimensions at definition 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectPreset {
    #[default]
    Square,
    Portrait,
    Story,
    Landscape,
    Classic,
}

impl AspectPreset {
    pub fn base_size(self) -> (u32, u32) {
        match self {
            AspectPreset::Square => (1080, 1080),
            AspectPreset::Portrait => (1080, 1350),
            AspectPreset::Story => (1080, 1920),
            AspectPreset::Landscape => (1920, 1080),
            AspectPreset::Classic => (1440, 1080),
        }
    }

    pub fn from_name(s: &str) -> LaminaResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" | "1:1" => Ok(Self::Square),
            "portrait" | "4:5" => Ok(Self::Portrait),
            "story" | "9:16" => Ok(Self::Story),
            "landscape" | "16:9" => Ok(Self::Landscape),
            "classic" | "4:3" => Ok(Self::Classic),
            other => Err(LaminaError::validation(format!(
                "unknown aspect preset \"{other}\""
            ))),
        }
    }
}

/// Allowed resolution multipliers.
pub const DEFINITIONS: [f32; 4] = [0.5, 1.0, 1.5, 2.0];

/// Aspect preset, resolution multiplier and optional solid background.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CanvasState {
    pub aspect: AspectPreset,
    pub definition: f32,
    pub background: Option<Rgba8>,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            aspect: AspectPreset::Square,
            definition: 1.0,
            background: None,
        }
    }
}

impl CanvasState {
    pub fn validate_definition(definition: f32) -> LaminaResult<f32> {
        DEFINITIONS
            .into_iter()
            .find(|d| (d - definition).abs() < 1e-6)
            .ok_or_else(|| {
                LaminaError::validation(format!(
                    "definition must be one of {DEFINITIONS:?}, got {definition}"
                ))
            })
    }

    /// Pixel dimensions for the current preset and definition.
    pub fn canvas(&self) -> Canvas {
        let (w, h) = self.aspect.base_size();
        Canvas {
            width: w,
            height: h,
        }
        .scaled(f64::from(self.definition))
    }
}

/// Per-axis factors that carry geometry from `from` to `to`.
pub fn rescale_factors(from: Canvas, to: Canvas) -> (f64, f64) {
    (
        f64::from(to.width) / f64::from(from.width.max(1)),
        f64::from(to.height) / f64::from(from.height.max(1)),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/layer/canvas.rs"]
mod tests;
