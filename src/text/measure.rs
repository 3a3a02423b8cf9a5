use crate::text::style::TextStyle;

/// Line-width measurement seam used by wrapping and auto-fit.
pub trait TextMeasure {
    /// Advance width of a single unwrapped line at `size` px.
    fn line_width(&mut self, line: &str, style: &TextStyle, size: f32) -> f32;
}

/// Deterministic per-character estimate used when no font face is registered.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApproxMeasure;

impl ApproxMeasure {
    pub fn char_advance(c: char, style: &TextStyle, size: f32) -> f32 {
        if c.is_whitespace() {
            return 0.3 * size;
        }
        let weight = 1.0 + (f32::from(style.weight) - 400.0) / 1000.0 * 0.25;
        style.family.approx_advance() * size * weight
    }
}

impl TextMeasure for ApproxMeasure {
    fn line_width(&mut self, line: &str, style: &TextStyle, size: f32) -> f32 {
        let scale = size / style.size.max(f32::EPSILON);
        line.chars()
            .map(|c| Self::char_advance(c, style, size) + style.letter_spacing * scale)
            .sum::<f32>()
            .max(0.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/measure.rs"]
mod tests;
