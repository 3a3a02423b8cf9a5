use crate::foundation::core::Canvas;
use crate::text::layout::{TextLayout, wrap_text};
use crate::text::measure::TextMeasure;
use crate::text::style::TextStyle;

/// Fraction of each canvas axis text may occupy.
pub const SAFE_AREA_FRACTION: f32 = 0.94;
/// Sizes below this are only used when nothing readable fits.
pub const READABLE_MIN_SIZE: f32 = 14.0;
pub const HARD_MIN_SIZE: f32 = 6.0;
pub const FIT_ITERATIONS: usize = 14;

const FIT_EPSILON: f32 = 1e-3;

/// Axis-aligned extent of a `w x h` box rotated by `rotation_deg`.
pub fn rotated_extent(w: f32, h: f32, rotation_deg: f32) -> (f32, f32) {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    (cos * w + sin * h, sin * w + cos * h)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SafeArea {
    pub width: f32,
    pub height: f32,
}

impl SafeArea {
    pub fn for_canvas(canvas: Canvas) -> Self {
        Self {
            width: canvas.width as f32 * SAFE_AREA_FRACTION,
            height: canvas.height as f32 * SAFE_AREA_FRACTION,
        }
    }

    fn admits(self, layout: &TextLayout, rotation_deg: f32) -> bool {
        let (w, h) = rotated_extent(layout.width, layout.height, rotation_deg);
        w <= self.width + FIT_EPSILON && h <= self.height + FIT_EPSILON
    }
}

/// Auto-fit outcome. `fits` is false only for the hard-minimum fallback.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedText {
    pub layout: TextLayout,
    pub fits: bool,
}

impl FittedText {
    pub fn rotated_extent(&self, rotation_deg: f32) -> (f32, f32) {
        rotated_extent(self.layout.width, self.layout.height, rotation_deg)
    }
}

/// Largest size not above `style.size` whose rotated layout fits the canvas safe area.
///
/// Searches the readable band first, then the band down to the hard minimum. When even the hard
/// minimum overflows, that layout is returned with `fits == false`.
pub fn auto_fit(
    m: &mut impl TextMeasure,
    content: &str,
    style: &TextStyle,
    rotation_deg: f32,
    canvas: Canvas,
) -> FittedText {
    let safe = SafeArea::for_canvas(canvas);
    let preferred = style.size.max(HARD_MIN_SIZE);

    let layout = layout_at(m, content, style, preferred, safe);
    if safe.admits(&layout, rotation_deg) {
        return FittedText { layout, fits: true };
    }

    if preferred > READABLE_MIN_SIZE
        && let Some(layout) = search(
            m,
            content,
            style,
            rotation_deg,
            safe,
            READABLE_MIN_SIZE,
            preferred,
        )
    {
        return FittedText { layout, fits: true };
    }

    let hi = preferred.min(READABLE_MIN_SIZE);
    if let Some(layout) = search(m, content, style, rotation_deg, safe, HARD_MIN_SIZE, hi) {
        return FittedText { layout, fits: true };
    }

    tracing::debug!(chars = content.len(), "text overflows at hard minimum size");
    FittedText {
        layout: layout_at(m, content, style, HARD_MIN_SIZE, safe),
        fits: false,
    }
}

fn layout_at(
    m: &mut impl TextMeasure,
    content: &str,
    style: &TextStyle,
    size: f32,
    safe: SafeArea,
) -> TextLayout {
    wrap_text(m, content, style, size, Some(safe.width))
}

fn search(
    m: &mut impl TextMeasure,
    content: &str,
    style: &TextStyle,
    rotation_deg: f32,
    safe: SafeArea,
    lo: f32,
    hi: f32,
) -> Option<TextLayout> {
    let mut best = layout_at(m, content, style, lo, safe);
    if !safe.admits(&best, rotation_deg) {
        return None;
    }
    let (mut lo, mut hi) = (lo, hi);
    for _ in 0..FIT_ITERATIONS {
        let mid = (lo + hi) / 2.0;
        let candidate = layout_at(m, content, style, mid, safe);
        if safe.admits(&candidate, rotation_deg) {
            lo = mid;
            best = candidate;
        } else {
            hi = mid;
        }
    }
    Some(best)
}

/// Vertical offset from canvas center that puts the rotated box against the top of the safe area.
pub fn pinned_top_offset(rotated_height: f32, canvas: Canvas) -> f64 {
    let safe = SafeArea::for_canvas(canvas);
    f64::from(-safe.height / 2.0 + rotated_height / 2.0)
}

#[cfg(test)]
#[path = "../../tests/unit/text/fit.rs"]
mod tests;
