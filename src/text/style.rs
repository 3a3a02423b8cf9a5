use crate::foundation::core::Rgba8;
use crate::foundation::error::{LaminaError, LaminaResult};
use crate::text::fonts::FontFamily;

pub const MIN_WEIGHT: u16 = 100;
pub const MAX_WEIGHT: u16 = 900;
pub const MIN_LINE_SPACING: f32 = 0.8;
pub const MAX_LINE_SPACING: f32 = 2.5;
pub const MAX_FONT_SIZE: f32 = 600.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Everything that shapes a text layer apart from its content.
///
/// `size` is the requested size; auto-fit may lay the text out smaller.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub family: FontFamily,
    pub size: f32,
    pub weight: u16,
    pub color: Rgba8,
    /// Extra advance after every character, in px.
    pub letter_spacing: f32,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
    pub align: TextAlign,
    pub pinned_top: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: FontFamily::Inter,
            size: 96.0,
            weight: 700,
            color: Rgba8::WHITE,
            letter_spacing: 0.0,
            line_spacing: 1.2,
            align: TextAlign::Center,
            pinned_top: false,
        }
    }
}

impl TextStyle {
    /// Reject non-finite values, clamp the rest into their ranges.
    pub fn sanitized(mut self) -> LaminaResult<Self> {
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(LaminaError::validation("text size must be finite and > 0"));
        }
        if !self.letter_spacing.is_finite() || !self.line_spacing.is_finite() {
            return Err(LaminaError::validation("text spacing must be finite"));
        }
        self.size = self.size.min(MAX_FONT_SIZE);
        self.weight = self.weight.clamp(MIN_WEIGHT, MAX_WEIGHT);
        self.line_spacing = self.line_spacing.clamp(MIN_LINE_SPACING, MAX_LINE_SPACING);
        Ok(self)
    }
}
