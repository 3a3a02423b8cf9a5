use crate::text::measure::TextMeasure;
use crate::text::style::{TextAlign, TextStyle};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LaidLine {
    pub text: String,
    pub width: f32,
}

/// Wrapped lines at one concrete font size.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextLayout {
    pub size: f32,
    pub lines: Vec<LaidLine>,
    pub line_height: f32,
    /// Widest line.
    pub width: f32,
    pub height: f32,
}

impl TextLayout {
    /// Horizontal offset of line `i` inside the layout box for the style's alignment.
    pub fn line_x(&self, i: usize, align: TextAlign) -> f32 {
        let Some(line) = self.lines.get(i) else {
            return 0.0;
        };
        match align {
            TextAlign::Left => 0.0,
            TextAlign::Center => (self.width - line.width) / 2.0,
            TextAlign::Right => self.width - line.width,
        }
    }
}

/// Greedy whitespace wrapping; tokens wider than `max_width` are broken per character.
///
/// Explicit newlines always start a new line, and empty paragraphs keep their height.
pub fn wrap_text(
    m: &mut impl TextMeasure,
    content: &str,
    style: &TextStyle,
    size: f32,
    max_width: Option<f32>,
) -> TextLayout {
    let mut lines = Vec::new();
    for paragraph in content.split('\n') {
        wrap_paragraph(m, paragraph, style, size, max_width, &mut lines);
    }

    let line_height = size * style.line_spacing;
    let width = lines.iter().map(|l| l.width).fold(0.0f32, f32::max);
    let height = line_height * lines.len() as f32;
    TextLayout {
        size,
        lines,
        line_height,
        width,
        height,
    }
}

fn wrap_paragraph(
    m: &mut impl TextMeasure,
    paragraph: &str,
    style: &TextStyle,
    size: f32,
    max_width: Option<f32>,
    out: &mut Vec<LaidLine>,
) {
    let mut measure = |s: &str| m.line_width(s, style, size);
    let Some(max) = max_width.filter(|w| w.is_finite() && *w > 0.0) else {
        let text = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
        let width = measure(&text);
        out.push(LaidLine { text, width });
        return;
    };

    let mut current = String::new();
    let mut current_w = 0.0;
    let mut pushed_any = false;
    for token in paragraph.split_whitespace() {
        let candidate = if current.is_empty() {
            token.to_string()
        } else {
            format!("{current} {token}")
        };
        let candidate_w = measure(&candidate);
        if candidate_w <= max {
            current = candidate;
            current_w = candidate_w;
            continue;
        }

        if !current.is_empty() {
            out.push(LaidLine {
                text: std::mem::take(&mut current),
                width: current_w,
            });
            pushed_any = true;
        }

        let token_w = measure(token);
        if token_w <= max {
            current = token.to_string();
            current_w = token_w;
            continue;
        }

        // Hard break: at least one character per line.
        let mut piece = String::new();
        let mut piece_w = 0.0;
        for c in token.chars() {
            let mut next = piece.clone();
            next.push(c);
            let next_w = measure(&next);
            if next_w > max && !piece.is_empty() {
                out.push(LaidLine {
                    text: std::mem::take(&mut piece),
                    width: piece_w,
                });
                pushed_any = true;
                piece.push(c);
                piece_w = measure(&piece);
            } else {
                piece = next;
                piece_w = next_w;
            }
        }
        current = piece;
        current_w = piece_w;
    }

    if !current.is_empty() || !pushed_any {
        out.push(LaidLine {
            text: current,
            width: current_w,
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
