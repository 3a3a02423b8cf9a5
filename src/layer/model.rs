use std::sync::Arc;

use image::RgbaImage;

use crate::adjust::AdjustParams;
use crate::adjust::memo::derived_key;
use crate::foundation::core::{Affine, Canvas, LayerId, Point, Rect, Vec2};
use crate::foundation::error::{LaminaError, LaminaResult};
use crate::mask::{AlphaMask, SegmentationState};
use crate::text::fit::{auto_fit, pinned_top_offset};
use crate::text::measure::TextMeasure;
use crate::text::{TextLayout, TextStyle};

pub const MIN_SCALE: f64 = 0.04;
pub const MAX_SCALE: f64 = 12.0;
pub const MAX_ROTATION_DEG: f64 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Image,
    Text,
}

/// Placement of a layer: offset from canvas center, uniform scale, rotation and flips.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation_deg: f64,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation_deg: 0.0,
            flip_x: false,
            flip_y: false,
        }
    }
}

impl Geometry {
    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() {
            self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        }
    }

    pub fn set_rotation(&mut self, deg: f64) {
        if deg.is_finite() {
            self.rotation_deg = deg.clamp(-MAX_ROTATION_DEG, MAX_ROTATION_DEG);
        }
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.x = x;
            self.y = y;
        }
    }

    /// Bring every field back into range; used after deserialization.
    pub fn normalized(mut self) -> Self {
        let d = Self::default();
        if !self.scale.is_finite() {
            self.scale = d.scale;
        }
        if !self.rotation_deg.is_finite() {
            self.rotation_deg = d.rotation_deg;
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            self.x = d.x;
            self.y = d.y;
        }
        self.scale = self.scale.clamp(MIN_SCALE, MAX_SCALE);
        self.rotation_deg = self.rotation_deg.clamp(-MAX_ROTATION_DEG, MAX_ROTATION_DEG);
        self
    }

    pub fn anchor(&self, canvas: Canvas) -> Point {
        canvas.center() + Vec2::new(self.x, self.y)
    }

    /// Content-space to canvas-space transform for content of `size`, drawn centered on the anchor.
    ///
    /// `extra_offset` and `extra_scale` come from animation and compose on top of the geometry.
    pub fn transform(
        &self,
        canvas: Canvas,
        size: Vec2,
        extra_offset: Vec2,
        extra_scale: f64,
    ) -> Affine {
        let s = self.scale * extra_scale;
        let sx = if self.flip_x { -s } else { s };
        let sy = if self.flip_y { -s } else { s };
        Affine::translate(self.anchor(canvas).to_vec2() + extra_offset)
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale_non_uniform(sx, sy)
            * Affine::translate(-size / 2.0)
    }
}

/// Properties shared by every layer kind.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayerProps {
    pub visible: bool,
    /// Percent, `0..=100`.
    pub opacity: f32,
    pub geometry: Geometry,
    pub shadow: bool,
}

impl Default for LayerProps {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: 100.0,
            geometry: Geometry::default(),
            shadow: false,
        }
    }
}

impl LayerProps {
    pub fn opacity_unit(&self) -> f32 {
        (self.opacity / 100.0).clamp(0.0, 1.0)
    }
}

/// Image content: immutable original, working base, optional mask and adjustments.
#[derive(Clone, Debug)]
pub struct ImageLayer {
    original: Arc<RgbaImage>,
    /// Colors the mask and adjustments apply to; de-spill rewrites this, reset restores it.
    base: Arc<RgbaImage>,
    mask: Option<AlphaMask>,
    pub(crate) segmentation: Option<SegmentationState>,
    pub adjust: AdjustParams,
    /// Bumped whenever `base` or `mask` changes.
    revision: u64,
}

impl ImageLayer {
    pub fn new(img: RgbaImage) -> Self {
        let original = Arc::new(img);
        Self {
            base: Arc::clone(&original),
            original,
            mask: None,
            segmentation: None,
            adjust: AdjustParams::default(),
            revision: 0,
        }
    }

    pub fn original(&self) -> &RgbaImage {
        &self.original
    }

    pub fn base(&self) -> &RgbaImage {
        &self.base
    }

    pub(crate) fn shared_base(&self) -> Arc<RgbaImage> {
        Arc::clone(&self.base)
    }

    pub fn mask(&self) -> Option<&AlphaMask> {
        self.mask.as_ref()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.base.dimensions()
    }

    pub fn size(&self) -> Vec2 {
        let (w, h) = self.dimensions();
        Vec2::new(f64::from(w), f64::from(h))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Memo key of the processed raster.
    pub fn processed_key(&self) -> u64 {
        derived_key(self.revision, self.adjust.clamped().fingerprint())
    }

    /// Mask to build on: the current one or a fresh opaque mask.
    pub fn working_mask(&self) -> AlphaMask {
        let (w, h) = self.dimensions();
        self.mask.clone().unwrap_or_else(|| AlphaMask::opaque(w, h))
    }

    /// Base with the mask applied, before adjustments.
    pub fn masked(&self) -> LaminaResult<RgbaImage> {
        match &self.mask {
            Some(m) => m.apply_to(&self.base),
            None => Ok(self.base.as_ref().clone()),
        }
    }

    pub(crate) fn set_mask(&mut self, mask: AlphaMask) -> LaminaResult<()> {
        if mask.dimensions() != self.dimensions() {
            return Err(LaminaError::validation("mask size does not match layer raster"));
        }
        self.mask = Some(mask);
        self.revision += 1;
        Ok(())
    }

    pub(crate) fn set_base(&mut self, base: RgbaImage) -> LaminaResult<()> {
        if base.dimensions() != self.dimensions() {
            return Err(LaminaError::validation("base size does not match layer raster"));
        }
        self.base = Arc::new(base);
        self.revision += 1;
        Ok(())
    }

    /// Drop the mask and any de-spill so the layer shows its original pixels again.
    pub fn reset_mask(&mut self) {
        self.mask = None;
        self.segmentation = None;
        self.base = Arc::clone(&self.original);
        self.revision += 1;
    }

    /// Original raster, no mask, neutral adjustments.
    pub fn reset(&mut self) {
        self.reset_mask();
        self.adjust = AdjustParams::default();
    }
}

/// Text content with its fitted layout cache.
#[derive(Clone, Debug)]
pub struct TextLayer {
    pub content: String,
    pub style: TextStyle,
    layout: TextLayout,
    fits: bool,
}

impl TextLayer {
    pub fn new(content: impl Into<String>, style: TextStyle) -> Self {
        Self {
            content: content.into(),
            style,
            layout: TextLayout::default(),
            fits: true,
        }
    }

    pub fn layout(&self) -> &TextLayout {
        &self.layout
    }

    /// Whether the last fit stayed inside the safe area.
    pub fn fits(&self) -> bool {
        self.fits
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(f64::from(self.layout.width), f64::from(self.layout.height))
    }

    /// Re-run auto-fit; pinned text is moved to the top of the safe area.
    pub fn refit(&mut self, m: &mut impl TextMeasure, geometry: &mut Geometry, canvas: Canvas) {
        let rotation = geometry.rotation_deg as f32;
        let fitted = auto_fit(m, &self.content, &self.style, rotation, canvas);
        if self.style.pinned_top {
            let (_, h) = fitted.rotated_extent(rotation);
            geometry.y = pinned_top_offset(h * geometry.scale as f32, canvas);
        }
        self.fits = fitted.fits;
        self.layout = fitted.layout;
    }
}

#[derive(Clone, Debug)]
pub enum LayerContent {
    Image(ImageLayer),
    Text(TextLayer),
}

#[derive(Clone, Debug)]
pub struct Layer {
    pub id: LayerId,
    pub props: LayerProps,
    pub content: LayerContent,
}

impl Layer {
    pub fn kind(&self) -> LayerKind {
        match self.content {
            LayerContent::Image(_) => LayerKind::Image,
            LayerContent::Text(_) => LayerKind::Text,
        }
    }

    /// Unscaled content size in px.
    pub fn content_size(&self) -> Vec2 {
        match &self.content {
            LayerContent::Image(img) => img.size(),
            LayerContent::Text(t) => t.size(),
        }
    }

    pub fn transform(&self, canvas: Canvas) -> Affine {
        self.props
            .geometry
            .transform(canvas, self.content_size(), Vec2::ZERO, 1.0)
    }

    /// Canvas point to content-local coordinates, if the transform is invertible.
    pub fn to_local(&self, canvas: Canvas, p: Point) -> Option<Point> {
        let t = self.transform(canvas);
        (t.determinant().abs() > f64::EPSILON).then(|| t.inverse() * p)
    }

    pub fn contains(&self, canvas: Canvas, p: Point) -> bool {
        let size = self.content_size();
        self.to_local(canvas, p)
            .is_some_and(|local| Rect::new(0.0, 0.0, size.x, size.y).contains(local))
    }

    pub fn as_image(&self) -> LaminaResult<&ImageLayer> {
        match &self.content {
            LayerContent::Image(img) => Ok(img),
            LayerContent::Text(_) => Err(LaminaError::validation(format!(
                "{} is not an image layer",
                self.id
            ))),
        }
    }

    pub fn as_image_mut(&mut self) -> LaminaResult<&mut ImageLayer> {
        match &mut self.content {
            LayerContent::Image(img) => Ok(img),
            LayerContent::Text(_) => Err(LaminaError::validation(format!(
                "{} is not an image layer",
                self.id
            ))),
        }
    }

    pub fn as_text_mut(&mut self) -> LaminaResult<&mut TextLayer> {
        match &mut self.content {
            LayerContent::Text(t) => Ok(t),
            LayerContent::Image(_) => Err(LaminaError::validation(format!(
                "{} is not a text layer",
                self.id
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/model.rs"]
mod tests;
