//! Layer stack to draw ops.
//!
//! Compilation resolves each rendered layer into a self-contained [`DrawOp`]: its paint (processed
//! raster or text layout), the content-to-canvas transform, opacity and optional shadow. The CPU
//! compositor only sees ops, so a pre-rasterized buffer can stand in for a live layer.

use std::sync::Arc;

use image::RgbaImage;

use crate::adjust::apply_adjustments;
use crate::adjust::memo::LayerMemo;
use crate::foundation::core::{Affine, Canvas, LayerId, Vec2};
use crate::foundation::error::LaminaResult;
use crate::layer::{ImageLayer, Layer, LayerContent, TextLayer};

pub const SHADOW_OPACITY: f32 = 0.34;
const SHADOW_OFFSET_FRACTION: f64 = 0.035;
const SHADOW_MIN_OFFSET: f64 = 2.0;
const SHADOW_BLUR_FRACTION: f64 = 0.02;
const SHADOW_BLUR_RANGE: (f64, f64) = (2.0, 24.0);

/// Per-frame motion applied on top of a layer's geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    pub offset: Vec2,
    /// Multiplies the geometry scale, about the layer anchor.
    pub scale: f64,
}

impl Motion {
    pub const IDENTITY: Self = Self {
        offset: Vec2::ZERO,
        scale: 1.0,
    };
}

impl Default for Motion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowSpec {
    /// Canvas-space downward offset in px.
    pub offset_y: f64,
    pub blur_px: f32,
    pub opacity: f32,
}

impl ShadowSpec {
    /// Shadow parameters for content drawn at `drawn` canvas px.
    pub fn for_drawn_size(drawn: Vec2) -> Self {
        let offset_y = (drawn.y.abs() * SHADOW_OFFSET_FRACTION).max(SHADOW_MIN_OFFSET);
        let blur = (drawn.x.abs().max(drawn.y.abs()) * SHADOW_BLUR_FRACTION)
            .clamp(SHADOW_BLUR_RANGE.0, SHADOW_BLUR_RANGE.1);
        Self {
            offset_y,
            blur_px: blur as f32,
            opacity: SHADOW_OPACITY,
        }
    }
}

#[derive(Clone, Debug)]
pub enum DrawPaint {
    /// Straight-alpha raster; `key` identifies its pixels for paint caching.
    Raster { key: u64, image: Arc<RgbaImage> },
    Text(Box<TextLayer>),
}

#[derive(Clone, Debug)]
pub struct DrawOp {
    pub layer: LayerId,
    pub paint: DrawPaint,
    /// Unscaled content size; the paint covers `(0, 0)..size` in content space.
    pub size: Vec2,
    pub transform: Affine,
    pub opacity: f32,
    pub shadow: Option<ShadowSpec>,
}

impl DrawOp {
    /// A pre-rasterized buffer standing in for a layer; opacity and shadow are already baked in.
    pub fn prerendered(layer: LayerId, key: u64, image: Arc<RgbaImage>, transform: Affine) -> Self {
        let size = Vec2::new(f64::from(image.width()), f64::from(image.height()));
        Self {
            layer,
            paint: DrawPaint::Raster { key, image },
            size,
            transform,
            opacity: 1.0,
            shadow: None,
        }
    }
}

/// Masked and adjusted raster for an image layer, memoized by source revision and parameters.
///
/// An unmasked layer with neutral parameters is drawn straight from its base and never memoized.
pub fn processed_raster(
    id: LayerId,
    img: &ImageLayer,
    memo: &mut LayerMemo<RgbaImage>,
) -> LaminaResult<(u64, Arc<RgbaImage>)> {
    let key = img.processed_key();
    if img.mask().is_none() && img.adjust.clamped().is_neutral() {
        return Ok((key, img.shared_base()));
    }
    let raster = memo.get_or_try_insert(id, key, || {
        let masked = img.masked()?;
        apply_adjustments(&masked, &img.adjust)
    })?;
    Ok((key, raster))
}

/// Compile one layer with `motion` applied.
pub fn compile_layer(
    layer: &Layer,
    canvas: Canvas,
    motion: Motion,
    memo: &mut LayerMemo<RgbaImage>,
) -> LaminaResult<DrawOp> {
    let paint = match &layer.content {
        LayerContent::Image(img) => {
            let (key, image) = processed_raster(layer.id, img, memo)?;
            DrawPaint::Raster { key, image }
        }
        LayerContent::Text(t) => DrawPaint::Text(Box::new(t.clone())),
    };
    let size = layer.content_size();
    let g = &layer.props.geometry;
    let transform = g.transform(canvas, size, motion.offset, motion.scale);
    let drawn = size * (g.scale * motion.scale);
    Ok(DrawOp {
        layer: layer.id,
        paint,
        size,
        transform,
        opacity: layer.props.opacity_unit(),
        shadow: layer.props.shadow.then(|| ShadowSpec::for_drawn_size(drawn)),
    })
}

/// Compile layers back to front, pairing each with its motion.
pub fn compile_layers(
    layers: &[&Layer],
    canvas: Canvas,
    motions: &[Motion],
    memo: &mut LayerMemo<RgbaImage>,
) -> LaminaResult<Vec<DrawOp>> {
    layers
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let motion = motions.get(i).copied().unwrap_or_default();
            compile_layer(layer, canvas, motion, memo)
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/compile.rs"]
mod tests;
