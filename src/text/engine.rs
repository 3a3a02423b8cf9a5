use crate::foundation::core::Rgba8;
use crate::foundation::error::{LaminaError, LaminaResult};
use crate::text::fonts::{FontBook, FontFamily, RegisteredFace};
use crate::text::measure::{ApproxMeasure, TextMeasure};
use crate::text::style::TextStyle;

/// Brush carried through parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgba8> for TextBrush {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Parley-backed shaping for registered families, approximate metrics for the rest.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    book: FontBook,
    fallback: ApproxMeasure,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEngine")
            .field("book", &self.book)
            .finish_non_exhaustive()
    }
}

impl TextEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            book: FontBook::default(),
            fallback: ApproxMeasure,
        }
    }

    /// Register the face used for `family`. Returns the family name found in the font data.
    pub fn register_font(&mut self, family: FontFamily, bytes: Vec<u8>) -> LaminaResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            LaminaError::validation(format!("no font families found for {}", family.slug()))
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| LaminaError::validation("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        tracing::debug!(family = family.slug(), %family_name, "registered font");
        self.book.insert(
            family,
            RegisteredFace {
                family_name: family_name.clone(),
                font,
            },
        );
        Ok(family_name)
    }

    pub fn has_font(&self, family: FontFamily) -> bool {
        self.book.contains(family)
    }

    pub(crate) fn font_data(&self, family: FontFamily) -> Option<vello_cpu::peniko::FontData> {
        self.book.get(family).map(|f| f.font.clone())
    }

    /// Shape one unwrapped line. `None` when the family has no registered face.
    ///
    /// Registered faces carry their own weight, so `style.weight` only affects approximate metrics.
    pub(crate) fn shape_line(
        &mut self,
        line: &str,
        style: &TextStyle,
        size: f32,
    ) -> Option<parley::Layout<TextBrush>> {
        let family_name = self.book.get(style.family)?.family_name.clone();
        let spacing = style.letter_spacing * size / style.size.max(f32::EPSILON);

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, line, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size));
        builder.push_default(parley::style::StyleProperty::LetterSpacing(spacing));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush::from(
            style.color,
        )));

        let mut layout: parley::Layout<TextBrush> = builder.build(line);
        layout.break_all_lines(None);
        Some(layout)
    }
}

impl TextMeasure for TextEngine {
    fn line_width(&mut self, line: &str, style: &TextStyle, size: f32) -> f32 {
        match self.shape_line(line, style, size) {
            Some(layout) => layout.width(),
            None => self.fallback.line_width(line, style, size),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/engine.rs"]
mod tests;
