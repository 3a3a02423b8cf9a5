use image::RgbaImage;

use crate::adjust::AdjustParams;
use crate::foundation::core::{Canvas, LayerId, Point};
use crate::foundation::error::{LaminaError, LaminaResult};
use crate::layer::canvas::rescale_factors;
use crate::layer::model::{
    Geometry, ImageLayer, Layer, LayerContent, LayerProps, MAX_SCALE, MIN_SCALE, TextLayer,
};
use crate::text::measure::TextMeasure;
use crate::text::TextStyle;

/// Default layer cap; builds may pick anything in `MIN_MAX_LAYERS..=MAX_MAX_LAYERS`.
pub const DEFAULT_MAX_LAYERS: usize = 8;
pub const MIN_MAX_LAYERS: usize = 6;
pub const MAX_MAX_LAYERS: usize = 10;

/// Ordered layer collection, back to front.
///
/// Invariants: ids are unique, `len() <= max_layers`, `active` and `solo` (when set) name layers
/// that exist.
#[derive(Debug)]
pub struct LayerStore {
    layers: Vec<Layer>,
    active: Option<LayerId>,
    solo: Option<LayerId>,
    next_id: u64,
    max_layers: usize,
}

impl LayerStore {
    pub fn new(max_layers: usize) -> Self {
        Self {
            layers: Vec::new(),
            active: None,
            solo: None,
            next_id: 1,
            max_layers: max_layers.clamp(MIN_MAX_LAYERS, MAX_MAX_LAYERS),
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn max_layers(&self) -> usize {
        self.max_layers
    }

    /// Back to front.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|l| l.id).collect()
    }

    pub fn active(&self) -> Option<LayerId> {
        self.active
    }

    pub fn solo(&self) -> Option<LayerId> {
        self.solo
    }

    pub fn index_of(&self, id: LayerId) -> LaminaResult<usize> {
        self.layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| LaminaError::validation(format!("unknown layer {id}")))
    }

    pub fn get(&self, id: LayerId) -> LaminaResult<&Layer> {
        let i = self.index_of(id)?;
        Ok(&self.layers[i])
    }

    pub fn get_mut(&mut self, id: LayerId) -> LaminaResult<&mut Layer> {
        let i = self.index_of(id)?;
        Ok(&mut self.layers[i])
    }

    pub fn select(&mut self, id: LayerId) -> LaminaResult<()> {
        self.index_of(id)?;
        self.active = Some(id);
        Ok(())
    }

    fn ensure_capacity(&self) -> LaminaResult<()> {
        if self.layers.len() >= self.max_layers {
            tracing::warn!(max = self.max_layers, "layer limit reached");
            return Err(LaminaError::CapacityExceeded {
                max: self.max_layers,
            });
        }
        Ok(())
    }

    fn alloc_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert at `index` (clamped to the end); the new layer becomes active.
    pub(crate) fn insert_layer(
        &mut self,
        index: usize,
        props: LayerProps,
        content: LayerContent,
    ) -> LaminaResult<LayerId> {
        self.ensure_capacity()?;
        let id = self.alloc_id();
        let index = index.min(self.layers.len());
        self.layers.insert(index, Layer { id, props, content });
        self.active = Some(id);
        Ok(id)
    }

    /// Add an image on top, scaled to fit inside the canvas.
    pub fn add_image(&mut self, img: RgbaImage, canvas: Canvas) -> LaminaResult<LayerId> {
        if img.width() == 0 || img.height() == 0 {
            return Err(LaminaError::validation("image has zero size"));
        }
        let mut props = LayerProps::default();
        props.geometry.set_scale(contain_scale(img.dimensions(), canvas));
        let end = self.layers.len();
        self.insert_layer(end, props, LayerContent::Image(ImageLayer::new(img)))
    }

    /// Add a centered text layer on top and fit it to the canvas.
    pub fn add_text(
        &mut self,
        content: impl Into<String>,
        style: TextStyle,
        m: &mut impl TextMeasure,
        canvas: Canvas,
    ) -> LaminaResult<LayerId> {
        let style = style.sanitized()?;
        let mut props = LayerProps::default();
        let mut text = TextLayer::new(content, style);
        text.refit(m, &mut props.geometry, canvas);
        let end = self.layers.len();
        self.insert_layer(end, props, LayerContent::Text(text))
    }

    /// Copy `id` into a new layer right above it.
    pub fn duplicate(&mut self, id: LayerId) -> LaminaResult<LayerId> {
        let i = self.index_of(id)?;
        let src = &self.layers[i];
        let (props, content) = (src.props, src.content.clone());
        self.insert_layer(i + 1, props, content)
    }

    pub fn delete(&mut self, id: LayerId) -> LaminaResult<()> {
        let i = self.index_of(id)?;
        self.layers.remove(i);
        if self.solo == Some(id) {
            self.solo = None;
        }
        if self.active == Some(id) {
            let next = i.min(self.layers.len().saturating_sub(1));
            self.active = self.layers.get(next).map(|l| l.id);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.active = None;
        self.solo = None;
    }

    /// Move `id` to `index` in back-to-front order (clamped).
    pub fn reorder(&mut self, id: LayerId, index: usize) -> LaminaResult<()> {
        let i = self.index_of(id)?;
        let layer = self.layers.remove(i);
        let index = index.min(self.layers.len());
        self.layers.insert(index, layer);
        Ok(())
    }

    pub fn move_up(&mut self, id: LayerId) -> LaminaResult<()> {
        let i = self.index_of(id)?;
        self.reorder(id, i + 1)
    }

    pub fn move_down(&mut self, id: LayerId) -> LaminaResult<()> {
        let i = self.index_of(id)?;
        self.reorder(id, i.saturating_sub(1))
    }

    pub fn move_to_front(&mut self, id: LayerId) -> LaminaResult<()> {
        self.reorder(id, usize::MAX)
    }

    pub fn move_to_back(&mut self, id: LayerId) -> LaminaResult<()> {
        self.reorder(id, 0)
    }

    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> LaminaResult<()> {
        self.get_mut(id)?.props.visible = visible;
        Ok(())
    }

    /// Show only `id`; soloing the solo layer again shows everything.
    pub fn toggle_solo(&mut self, id: LayerId) -> LaminaResult<()> {
        self.index_of(id)?;
        self.solo = if self.solo == Some(id) { None } else { Some(id) };
        Ok(())
    }

    pub fn set_opacity(&mut self, id: LayerId, opacity: f32) -> LaminaResult<()> {
        if !opacity.is_finite() {
            return Err(LaminaError::validation("opacity must be finite"));
        }
        self.get_mut(id)?.props.opacity = opacity.clamp(0.0, 100.0);
        Ok(())
    }

    pub fn set_shadow(&mut self, id: LayerId, shadow: bool) -> LaminaResult<()> {
        self.get_mut(id)?.props.shadow = shadow;
        Ok(())
    }

    pub fn set_rotation(
        &mut self,
        id: LayerId,
        deg: f64,
        m: &mut impl TextMeasure,
        canvas: Canvas,
    ) -> LaminaResult<()> {
        self.get_mut(id)?.props.geometry.set_rotation(deg);
        self.refit_layer(id, m, canvas)
    }

    pub fn toggle_flip_x(&mut self, id: LayerId) -> LaminaResult<()> {
        let g = &mut self.get_mut(id)?.props.geometry;
        g.flip_x = !g.flip_x;
        Ok(())
    }

    pub fn toggle_flip_y(&mut self, id: LayerId) -> LaminaResult<()> {
        let g = &mut self.get_mut(id)?.props.geometry;
        g.flip_y = !g.flip_y;
        Ok(())
    }

    /// Clamped to `[MIN_SCALE, MAX_SCALE]`.
    pub fn set_scale(&mut self, id: LayerId, scale: f64) -> LaminaResult<()> {
        if !scale.is_finite() {
            return Err(LaminaError::validation("scale must be finite"));
        }
        self.get_mut(id)?.props.geometry.set_scale(scale);
        Ok(())
    }

    pub fn set_position(&mut self, id: LayerId, x: f64, y: f64) -> LaminaResult<()> {
        self.get_mut(id)?.props.geometry.set_position(x, y);
        Ok(())
    }

    /// Centered, unrotated, unflipped; images return to their contain-fit scale.
    pub fn reset_geometry(
        &mut self,
        id: LayerId,
        m: &mut impl TextMeasure,
        canvas: Canvas,
    ) -> LaminaResult<()> {
        let layer = self.get_mut(id)?;
        let mut g = Geometry::default();
        if let LayerContent::Image(img) = &layer.content {
            g.set_scale(contain_scale(img.dimensions(), canvas));
        }
        layer.props.geometry = g;
        self.refit_layer(id, m, canvas)
    }

    /// Original raster, neutral adjustments, no mask.
    pub fn reset_image(&mut self, id: LayerId) -> LaminaResult<()> {
        self.get_mut(id)?.as_image_mut()?.reset();
        Ok(())
    }

    pub fn set_adjustments(&mut self, id: LayerId, params: AdjustParams) -> LaminaResult<()> {
        self.get_mut(id)?.as_image_mut()?.adjust = params.clamped();
        Ok(())
    }

    pub fn set_text_content(
        &mut self,
        id: LayerId,
        content: impl Into<String>,
        m: &mut impl TextMeasure,
        canvas: Canvas,
    ) -> LaminaResult<()> {
        self.get_mut(id)?.as_text_mut()?.content = content.into();
        self.refit_layer(id, m, canvas)
    }

    pub fn set_text_style(
        &mut self,
        id: LayerId,
        style: TextStyle,
        m: &mut impl TextMeasure,
        canvas: Canvas,
    ) -> LaminaResult<()> {
        let style = style.sanitized()?;
        self.get_mut(id)?.as_text_mut()?.style = style;
        self.refit_layer(id, m, canvas)
    }

    fn refit_layer(
        &mut self,
        id: LayerId,
        m: &mut impl TextMeasure,
        canvas: Canvas,
    ) -> LaminaResult<()> {
        let layer = self.get_mut(id)?;
        if let LayerContent::Text(t) = &mut layer.content {
            t.refit(m, &mut layer.props.geometry, canvas);
        }
        Ok(())
    }

    /// Re-run auto-fit on every text layer.
    pub fn refit_all_text(&mut self, m: &mut impl TextMeasure, canvas: Canvas) {
        for layer in &mut self.layers {
            if let LayerContent::Text(t) = &mut layer.content {
                t.refit(m, &mut layer.props.geometry, canvas);
            }
        }
    }

    /// Carry every layer from canvas `from` to canvas `to`, keeping relative placement.
    pub fn rescale(&mut self, from: Canvas, to: Canvas, m: &mut impl TextMeasure) {
        let (fx, fy) = rescale_factors(from, to);
        let f = fx.min(fy);
        for layer in &mut self.layers {
            let g = &mut layer.props.geometry;
            g.x *= fx;
            g.y *= fy;
            if let LayerContent::Text(t) = &mut layer.content {
                t.style.size = (t.style.size * f as f32).max(1.0);
                t.style.letter_spacing *= f as f32;
            } else {
                g.set_scale(g.scale * f);
            }
        }
        self.refit_all_text(m, to);
    }

    /// Layers that render, back to front: only the solo layer while one is set.
    pub fn render_order(&self) -> Vec<&Layer> {
        match self.solo {
            Some(solo) => self.layers.iter().filter(|l| l.id == solo).collect(),
            None => self.layers.iter().filter(|l| l.props.visible).collect(),
        }
    }

    /// Topmost rendered layer under `p`.
    pub fn hit_test(&self, p: Point, canvas: Canvas) -> Option<LayerId> {
        self.render_order()
            .into_iter()
            .rev()
            .find(|l| l.contains(canvas, p))
            .map(|l| l.id)
    }

    /// Remove `ids` and put `merged` where the back-most of them was.
    pub(crate) fn replace_with_merged(
        &mut self,
        ids: &[LayerId],
        merged: RgbaImage,
    ) -> LaminaResult<LayerId> {
        let index = ids
            .iter()
            .map(|id| self.index_of(*id))
            .collect::<LaminaResult<Vec<_>>>()?
            .into_iter()
            .min()
            .ok_or_else(|| LaminaError::empty_composition("nothing to merge"))?;
        self.layers.retain(|l| !ids.contains(&l.id));
        if self.solo.is_some_and(|s| ids.contains(&s)) {
            self.solo = None;
        }
        let id = self.alloc_id();
        self.layers.insert(
            index.min(self.layers.len()),
            Layer {
                id,
                props: LayerProps::default(),
                content: LayerContent::Image(ImageLayer::new(merged)),
            },
        );
        self.active = Some(id);
        Ok(id)
    }
}

/// Largest scale at which an image of `dims` fits inside the canvas.
pub fn contain_scale(dims: (u32, u32), canvas: Canvas) -> f64 {
    let (w, h) = dims;
    let s = (f64::from(canvas.width) / f64::from(w.max(1)))
        .min(f64::from(canvas.height) / f64::from(h.max(1)));
    s.clamp(MIN_SCALE, MAX_SCALE)
}

#[cfg(test)]
#[path = "../../tests/unit/layer/store.rs"]
mod tests;
