//! `CompositionSession`: the context object every editing, rendering and export operation goes
//! through.
//!
//! The session owns the layer store, canvas settings, the renderer (live surface, compositor,
//! text engine and processed-raster memo), the gesture controller and at most one brush session.
//! A layer under an active brush session is locked: other mutations of it are refused until the
//! session is committed or cancelled.

use std::collections::HashSet;
use std::path::Path;
use std::sync::mpsc::Sender;

use image::RgbaImage;
use image::imageops::FilterType;

use crate::adjust::AdjustParams;
use crate::animate::parallax::{self, ParallaxOpts, Progress};
use crate::encode::sink::FrameSink;
use crate::foundation::core::{Canvas, LayerId, Point, Rgba8};
use crate::foundation::error::{LaminaError, LaminaResult};
use crate::interact::{GestureController, GestureState, PointerId};
use crate::layer::store::{DEFAULT_MAX_LAYERS, LayerStore};
use crate::layer::{AspectPreset, CanvasState, Layer};
use crate::mask::segment::{DEFAULT_SEGMENTATION_STRENGTH, alpha_from_segmentation};
use crate::mask::{
    AlphaMask, BrushEditor, ChromaKeyer, ChromaParams, SegmentationRequest, SegmentationState,
};
use crate::project::{ProjectDef, project_from_layers, resolve_layers};
use crate::raster::decode::{decode_image, encode_png};
use crate::render::pipeline::Renderer;
use crate::render::surface::Surface;
use crate::text::{FontFamily, TextStyle};

pub const DEFAULT_BRUSH_UNDO_DEPTH: usize = 20;
const MAX_EXPORT_SCALE: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionOpts {
    /// Clamped to `6..=10` by the store.
    pub max_layers: usize,
    pub brush_undo_depth: usize,
    pub canvas: CanvasState,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            max_layers: DEFAULT_MAX_LAYERS,
            brush_undo_depth: DEFAULT_BRUSH_UNDO_DEPTH,
            canvas: CanvasState::default(),
        }
    }
}

impl SessionOpts {
    /// Defaults overridden by `LAMINA_MAX_LAYERS` and `LAMINA_BRUSH_UNDO_DEPTH` when they parse
    /// to a positive integer.
    pub fn from_env() -> Self {
        let var = |name: &str| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&v| v > 0)
        };
        let d = Self::default();
        Self {
            max_layers: var("LAMINA_MAX_LAYERS").unwrap_or(d.max_layers),
            brush_undo_depth: var("LAMINA_BRUSH_UNDO_DEPTH").unwrap_or(d.brush_undo_depth),
            canvas: d.canvas,
        }
    }
}

#[derive(Debug)]
struct BrushSession {
    layer: LayerId,
    editor: BrushEditor,
    /// Mask to put back on cancel.
    before: AlphaMask,
}

#[derive(Debug)]
pub struct CompositionSession {
    store: LayerStore,
    canvas: CanvasState,
    renderer: Renderer,
    gestures: GestureController,
    brush: Option<BrushSession>,
    brush_undo_depth: usize,
}

impl CompositionSession {
    pub fn new(opts: SessionOpts) -> LaminaResult<Self> {
        let canvas = CanvasState {
            definition: CanvasState::validate_definition(opts.canvas.definition)?,
            ..opts.canvas
        };
        Ok(Self {
            store: LayerStore::new(opts.max_layers),
            renderer: Renderer::new(canvas.canvas())?,
            canvas,
            gestures: GestureController::new(),
            brush: None,
            brush_undo_depth: opts.brush_undo_depth.max(1),
        })
    }

    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    pub fn layers(&self) -> &[Layer] {
        self.store.layers()
    }

    pub fn layer(&self, id: LayerId) -> LaminaResult<&Layer> {
        self.store.get(id)
    }

    pub fn canvas_state(&self) -> CanvasState {
        self.canvas
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas.canvas()
    }

    /// The live composite as of the last [`render`](Self::render).
    pub fn surface(&self) -> &Surface {
        self.renderer.surface()
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gestures.state()
    }

    fn ensure_unlocked(&self, id: LayerId) -> LaminaResult<()> {
        if self.brush.as_ref().is_some_and(|b| b.layer == id) {
            return Err(LaminaError::validation(format!(
                "{id} is locked by an active brush session"
            )));
        }
        Ok(())
    }

    fn warn_if_unregistered(&self, family: FontFamily) {
        if !self.renderer.text.has_font(family) {
            tracing::warn!(family = family.slug(), "no font registered, using approximate metrics");
        }
    }

    fn forget_dead_layers(&mut self) {
        let alive: HashSet<LayerId> = self.store.ids().into_iter().collect();
        self.renderer.forget_dead(|id| alive.contains(&id));
    }

    // Fonts

    /// Register font bytes for `family` and re-fit every text layer with the real metrics.
    pub fn register_font(&mut self, family: FontFamily, bytes: Vec<u8>) -> LaminaResult<String> {
        let name = self.renderer.text.register_font(family, bytes)?;
        let canvas = self.canvas();
        self.store.refit_all_text(&mut self.renderer.text, canvas);
        Ok(name)
    }

    // Layer store

    pub fn add_image(&mut self, img: RgbaImage) -> LaminaResult<LayerId> {
        let canvas = self.canvas();
        self.store.add_image(img, canvas)
    }

    pub fn add_image_bytes(&mut self, bytes: &[u8]) -> LaminaResult<LayerId> {
        self.add_image(decode_image(bytes)?)
    }

    pub fn add_text(
        &mut self,
        content: impl Into<String>,
        style: TextStyle,
    ) -> LaminaResult<LayerId> {
        self.warn_if_unregistered(style.family);
        let canvas = self.canvas();
        self.store
            .add_text(content, style, &mut self.renderer.text, canvas)
    }

    pub fn duplicate(&mut self, id: LayerId) -> LaminaResult<LayerId> {
        self.store.duplicate(id)
    }

    pub fn delete(&mut self, id: LayerId) -> LaminaResult<()> {
        self.ensure_unlocked(id)?;
        self.store.delete(id)?;
        if self.gestures.target() == Some(id) {
            self.gestures.cancel();
        }
        self.forget_dead_layers();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.brush = None;
        self.gestures.cancel();
        self.store.clear();
        self.forget_dead_layers();
    }

    pub fn select(&mut self, id: LayerId) -> LaminaResult<()> {
        self.store.select(id)
    }

    pub fn reorder(&mut self, id: LayerId, index: usize) -> LaminaResult<()> {
        self.store.reorder(id, index)
    }

    pub fn move_up(&mut self, id: LayerId) -> LaminaResult<()> {
        self.store.move_up(id)
    }

    pub fn move_down(&mut self, id: LayerId) -> LaminaResult<()> {
        self.store.move_down(id)
    }

    pub fn move_to_front(&mut self, id: LayerId) -> LaminaResult<()> {
        self.store.move_to_front(id)
    }

    pub fn move_to_back(&mut self, id: LayerId) -> LaminaResult<()> {
        self.store.move_to_back(id)
    }

    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> LaminaResult<()> {
        self.store.set_visible(id, visible)
    }

    pub fn toggle_solo(&mut self, id: LayerId) -> LaminaResult<()> {
        self.store.toggle_solo(id)
    }

    pub fn set_opacity(&mut self, id: LayerId, opacity: f32) -> LaminaResult<()> {
        self.store.set_opacity(id, opacity)
    }

    pub fn set_shadow(&mut self, id: LayerId, shadow: bool) -> LaminaResult<()> {
        self.store.set_shadow(id, shadow)
    }

    pub fn set_rotation(&mut self, id: LayerId, deg: f64) -> LaminaResult<()> {
        self.ensure_unlocked(id)?;
        let canvas = self.canvas();
        self.store
            .set_rotation(id, deg, &mut self.renderer.text, canvas)
    }

    pub fn toggle_flip_x(&mut self, id: LayerId) -> LaminaResult<()> {
        self.ensure_unlocked(id)?;
        self.store.toggle_flip_x(id)
    }

    pub fn toggle_flip_y(&mut self, id: LayerId) -> LaminaResult<()> {
        self.ensure_unlocked(id)?;
        self.store.toggle_flip_y(id)
    }

    pub fn set_scale(&mut self, id: LayerId, scale: f64) -> LaminaResult<()> {
        self.ensure_unlocked(id)?;
        self.store.set_scale(id, scale)
    }

    pub fn set_position(&mut self, id: LayerId, x: f64, y: f64) -> LaminaResult<()> {
        self.ensure_unlocked(id)?;
        self.store.set_position(id, x, y)
    }

    pub fn reset_geometry(&mut self, id: LayerId) -> LaminaResult<()> {
        self.ensure_unlocked(id)?;
        let canvas = self.canvas();
        self.store
            .reset_geometry(id, &mut self.renderer.text, canvas)
    }

    pub fn reset_image(&mut self, id: LayerId) -> LaminaResult<()> {
        self.ensure_unlocked(id)?;
        self.store.reset_image(id)
    }

    pub fn set_adjustments(&mut self, id: LayerId, params: AdjustParams) -> LaminaResult<()> {
        self.store.set_adjustments(id, params)
    }

    pub fn set_text_content(
        &mut self,
        id: LayerId,
        content: impl Into<String>,
    ) -> LaminaResult<()> {
        let canvas = self.canvas();
        self.store
            .set_text_content(id, content, &mut self.renderer.text, canvas)
    }

    pub fn set_text_style(&mut self, id: LayerId, style: TextStyle) -> LaminaResult<()> {
        self.warn_if_unregistered(style.family);
        let canvas = self.canvas();
        self.store
            .set_text_style(id, style, &mut self.renderer.text, canvas)
    }

    pub fn hit_test(&self, p: Point) -> Option<LayerId> {
        self.store.hit_test(p, self.canvas())
    }

    // Canvas

    /// Switch preset/definition/background; layers keep their relative placement.
    #[tracing::instrument(skip(self))]
    pub fn set_canvas(&mut self, state: CanvasState) -> LaminaResult<()> {
        let state = CanvasState {
            definition: CanvasState::validate_definition(state.definition)?,
            ..state
        };
        let from = self.canvas();
        let to = state.canvas();
        self.renderer.resize(to)?;
        self.canvas = state;
        if from != to {
            self.store.rescale(from, to, &mut self.renderer.text);
        }
        Ok(())
    }

    pub fn set_aspect(&mut self, aspect: AspectPreset) -> LaminaResult<()> {
        self.set_canvas(CanvasState {
            aspect,
            ..self.canvas
        })
    }

    pub fn set_definition(&mut self, definition: f32) -> LaminaResult<()> {
        self.set_canvas(CanvasState {
            definition,
            ..self.canvas
        })
    }

    pub fn set_background(&mut self, background: Option<Rgba8>) {
        self.canvas.background = background;
    }

    // Rendering

    /// Recomposite the live surface.
    pub fn render(&mut self) -> LaminaResult<()> {
        let layers = self.store.render_order();
        self.renderer
            .render_frame(&layers, &[], self.canvas.background)
    }

    // Brush masking

    /// Start painting the mask of image layer `id`; the layer is locked until commit or cancel.
    pub fn begin_brush(&mut self, id: LayerId) -> LaminaResult<()> {
        if let Some(b) = &self.brush {
            return Err(LaminaError::validation(format!(
                "brush session already active on {}",
                b.layer
            )));
        }
        let mask = self.store.get(id)?.as_image()?.working_mask();
        if self.gestures.target() == Some(id) {
            self.gestures.cancel();
        }
        self.brush = Some(BrushSession {
            layer: id,
            editor: BrushEditor::new(mask.clone(), self.brush_undo_depth),
            before: mask,
        });
        tracing::debug!(%id, "brush session started");
        Ok(())
    }

    pub fn brush(&self) -> Option<&BrushEditor> {
        self.brush.as_ref().map(|b| &b.editor)
    }

    /// Mode, radius and hardness live on the editor.
    pub fn brush_mut(&mut self) -> Option<&mut BrushEditor> {
        self.brush.as_mut().map(|b| &mut b.editor)
    }

    fn brush_session(&mut self) -> LaminaResult<&mut BrushSession> {
        self.brush
            .as_mut()
            .ok_or_else(|| LaminaError::validation("no active brush session"))
    }

    /// Push the editor's mask onto the layer so the next render shows it.
    fn sync_brush_mask(&mut self) -> LaminaResult<()> {
        let (layer, mask) = {
            let b = self.brush_session()?;
            (b.layer, b.editor.mask().clone())
        };
        self.store.get_mut(layer)?.as_image_mut()?.set_mask(mask)
    }

    /// Canvas point to raster pixels of the brushed layer.
    fn brush_local(&self, p: Point) -> LaminaResult<Option<Point>> {
        let Some(b) = &self.brush else {
            return Err(LaminaError::validation("no active brush session"));
        };
        Ok(self.store.get(b.layer)?.to_local(self.canvas(), p))
    }

    pub fn brush_pointer_down(&mut self, p: Point) -> LaminaResult<()> {
        let Some(local) = self.brush_local(p)? else {
            return Ok(());
        };
        self.brush_session()?.editor.pointer_down(local);
        self.sync_brush_mask()
    }

    /// Returns `true` when the stroke changed the mask.
    pub fn brush_pointer_move(&mut self, p: Point) -> LaminaResult<bool> {
        let Some(local) = self.brush_local(p)? else {
            return Ok(false);
        };
        if !self.brush_session()?.editor.pointer_move(local) {
            return Ok(false);
        }
        self.sync_brush_mask()?;
        Ok(true)
    }

    pub fn brush_pointer_up(&mut self) -> LaminaResult<()> {
        self.brush_session()?.editor.pointer_up();
        Ok(())
    }

    pub fn brush_undo(&mut self) -> LaminaResult<bool> {
        if !self.brush_session()?.editor.undo() {
            return Ok(false);
        }
        self.sync_brush_mask()?;
        Ok(true)
    }

    pub fn brush_redo(&mut self) -> LaminaResult<bool> {
        if !self.brush_session()?.editor.redo() {
            return Ok(false);
        }
        self.sync_brush_mask()?;
        Ok(true)
    }

    /// Keep the painted mask and unlock the layer.
    pub fn commit_brush(&mut self) -> LaminaResult<()> {
        self.sync_brush_mask()?;
        if let Some(b) = self.brush.take() {
            let img = self.store.get_mut(b.layer)?.as_image_mut()?;
            img.segmentation = None;
            tracing::debug!(layer = %b.layer, "brush session committed");
        }
        Ok(())
    }

    /// Put the pre-session mask back and unlock the layer.
    pub fn cancel_brush(&mut self) -> LaminaResult<()> {
        let Some(b) = self.brush.take() else {
            return Ok(());
        };
        self.store
            .get_mut(b.layer)?
            .as_image_mut()?
            .set_mask(b.before)
    }

    // Chroma key

    /// Key out `params`' reference color, restricting the current mask, and de-spill the colors.
    #[tracing::instrument(skip(self))]
    pub fn apply_chroma_key(&mut self, id: LayerId, params: ChromaParams) -> LaminaResult<()> {
        self.ensure_unlocked(id)?;
        let img = self.store.get(id)?.as_image()?;
        let keyer = ChromaKeyer::new(params);
        let (key_mask, strengths) = keyer.build_mask(img.base());
        let mut mask = img.working_mask();
        mask.intersect(&key_mask)?;
        let mut base = img.base().clone();
        keyer.despill_in_place(&mut base, &strengths);

        let img = self.store.get_mut(id)?.as_image_mut()?;
        img.set_base(base)?;
        img.set_mask(mask)?;
        img.segmentation = None;
        Ok(())
    }

    /// Eyedropper: straight color of layer `id` under canvas point `p`.
    pub fn sample_key_color(&self, id: LayerId, p: Point) -> LaminaResult<Rgba8> {
        let layer = self.store.get(id)?;
        let img = layer.as_image()?;
        let scale = layer.props.geometry.scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(LaminaError::invalid_color_sample("layer has zero scale"));
        }
        let local = layer
            .to_local(self.canvas(), p)
            .ok_or_else(|| LaminaError::invalid_color_sample("layer transform is degenerate"))?;
        let (w, h) = img.dimensions();
        if local.x < 0.0 || local.y < 0.0 || local.x >= f64::from(w) || local.y >= f64::from(h) {
            return Err(LaminaError::invalid_color_sample(format!(
                "point ({:.1}, {:.1}) is outside {id}",
                p.x, p.y
            )));
        }
        let px = img.base().get_pixel(local.x as u32, local.y as u32);
        Ok(Rgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
    }

    /// Sample the key at `p`, then key it out with eyedropper defaults.
    pub fn chroma_key_from_sample(&mut self, id: LayerId, p: Point) -> LaminaResult<Rgba8> {
        let color = self.sample_key_color(id, p)?;
        self.apply_chroma_key(id, ChromaParams::sampled(color))?;
        Ok(color)
    }

    // Segmentation

    /// Snapshot layer `id` for an out-of-band segmentation run.
    ///
    /// Nothing changes here; pass the service output to
    /// [`ingest_segmentation`](Self::ingest_segmentation).
    pub fn segmentation_request(&self, id: LayerId) -> LaminaResult<SegmentationRequest> {
        self.ensure_unlocked(id)?;
        let img = self.store.get(id)?.as_image()?;
        Ok(SegmentationRequest {
            layer: id,
            png: encode_png(img.base())?,
            revision: img.revision(),
            size: img.dimensions(),
        })
    }

    /// Restrict the mask of `request`'s layer with the remapped alpha in `bytes`.
    ///
    /// Refused with nothing changed when `bytes` does not decode, or when the layer was removed,
    /// edited or brush-locked after the request was taken.
    #[tracing::instrument(skip(self, request, bytes), fields(layer = %request.layer))]
    pub fn ingest_segmentation(
        &mut self,
        request: &SegmentationRequest,
        bytes: &[u8],
        strength: f32,
    ) -> LaminaResult<()> {
        let id = request.layer;
        let (w, h) = request.size;
        let raw = self
            .check_segmentation_target(request)
            .and_then(|()| alpha_from_segmentation(bytes, w, h))
            .inspect_err(|e| tracing::warn!(%id, error = %e, "segmentation failed"))?;

        let img = self.store.get_mut(id)?.as_image_mut()?;
        let base = match &img.segmentation {
            Some(prev) => prev.base.clone(),
            None => img.working_mask(),
        };
        let strength = sanitize_strength(strength);
        let state = SegmentationState::new(raw, base, strength);
        img.set_mask(state.resolve()?)?;
        img.segmentation = Some(state);
        Ok(())
    }

    fn check_segmentation_target(&self, request: &SegmentationRequest) -> LaminaResult<()> {
        let id = request.layer;
        self.ensure_unlocked(id)?;
        let img = self.store.get(id)?.as_image()?;
        if img.dimensions() != request.size || img.revision() != request.revision {
            return Err(LaminaError::segmentation(format!(
                "{id} changed after segmentation was requested"
            )));
        }
        Ok(())
    }

    /// Re-run only the strength remap of the last segmentation on layer `id`.
    pub fn set_segmentation_strength(&mut self, id: LayerId, strength: f32) -> LaminaResult<()> {
        self.ensure_unlocked(id)?;
        let img = self.store.get_mut(id)?.as_image_mut()?;
        let Some(state) = img.segmentation.as_mut() else {
            return Err(LaminaError::validation(format!("{id} has no segmentation mask")));
        };
        state.strength = sanitize_strength(strength);
        let mask = state.resolve()?;
        img.set_mask(mask)
    }

    /// Drop every mask technique (and de-spill) from layer `id`.
    pub fn reset_mask(&mut self, id: LayerId) -> LaminaResult<()> {
        self.ensure_unlocked(id)?;
        self.store.get_mut(id)?.as_image_mut()?.reset_mask();
        Ok(())
    }

    // Merge and export

    /// Flatten all visible layers into one image layer at the back-most visible position.
    #[tracing::instrument(skip(self))]
    pub fn merge_visible(&mut self) -> LaminaResult<LayerId> {
        if self.brush.is_some() {
            return Err(LaminaError::validation("finish the brush session before merging"));
        }
        let visible: Vec<&Layer> = self
            .store
            .layers()
            .iter()
            .filter(|l| l.props.visible)
            .collect();
        if visible.len() < 2 {
            return Err(LaminaError::empty_composition(format!(
                "merge needs at least two visible layers, found {}",
                visible.len()
            )));
        }
        let ids: Vec<LayerId> = visible.iter().map(|l| l.id).collect();
        let ops = self.renderer.compile(&visible, &[])?;
        let mut scratch = Surface::new(self.canvas())?;
        self.renderer.render_ops_into(&mut scratch, &ops)?;
        let merged = scratch.to_rgba_image()?;

        self.gestures.cancel();
        let id = self.store.replace_with_merged(&ids, merged)?;
        self.forget_dead_layers();
        tracing::info!(merged = ids.len(), %id, "visible layers merged");
        Ok(id)
    }

    /// Render the composite and return it at `scale` times the canvas size.
    pub fn export_still(&mut self, scale: f64) -> LaminaResult<RgbaImage> {
        if !scale.is_finite() || scale <= 0.0 || scale > MAX_EXPORT_SCALE {
            return Err(LaminaError::validation(format!(
                "export scale must be in (0, {MAX_EXPORT_SCALE}], got {scale}"
            )));
        }
        if self.store.render_order().is_empty() {
            return Err(LaminaError::empty_composition("nothing visible to export"));
        }
        self.render()?;
        let img = self.renderer.surface().to_rgba_image()?;
        let out = self.canvas().scaled(scale);
        if out == self.canvas() {
            return Ok(img);
        }
        Ok(image::imageops::resize(&img, out.width, out.height, FilterType::Triangle))
    }

    /// Synthesize and encode a parallax loop of the rendered layers into `sink`.
    pub fn export_parallax(
        &mut self,
        opts: &ParallaxOpts,
        sink: &mut dyn FrameSink,
        progress: Option<&Sender<Progress>>,
    ) -> LaminaResult<Vec<u8>> {
        let layers = self.store.render_order();
        parallax::synthesize(
            &mut self.renderer,
            &layers,
            self.canvas.background,
            opts,
            sink,
            progress,
        )
    }

    /// One motion frame at progress `p` from the live layers.
    pub fn preview_parallax(&mut self, opts: &ParallaxOpts, p: f64) -> LaminaResult<RgbaImage> {
        let layers = self.store.render_order();
        parallax::preview_frame(&mut self.renderer, &layers, self.canvas.background, opts, p)
    }

    // Projects

    pub fn export_project(&self) -> LaminaResult<ProjectDef> {
        project_from_layers(self.store.layers(), self.canvas)
    }

    /// Replace the whole composition with `def`; on error the session is unchanged.
    #[tracing::instrument(skip_all, fields(layers = def.layers.len()))]
    pub fn import_project(
        &mut self,
        def: &ProjectDef,
        base_dir: Option<&Path>,
    ) -> LaminaResult<()> {
        def.validate(self.store.max_layers())?;
        let layers = resolve_layers(def, base_dir)?;
        let canvas = def.canvas.canvas();
        self.renderer.resize(canvas)?;

        self.brush = None;
        self.gestures.cancel();
        self.store.clear();
        self.canvas = def.canvas;
        for (props, content) in layers {
            let end = self.store.len();
            self.store.insert_layer(end, props, content)?;
        }
        self.store.refit_all_text(&mut self.renderer.text, canvas);
        self.forget_dead_layers();
        Ok(())
    }

    // Gestures

    /// Hit-test and start dragging (or pinching, for a second pointer). Ignored while brushing.
    #[tracing::instrument(skip(self))]
    pub fn pointer_down(&mut self, id: PointerId, p: Point) -> LaminaResult<Option<LayerId>> {
        if self.brush.is_some() {
            return Ok(None);
        }
        let canvas = self.canvas();
        self.gestures.pointer_down(id, p, &mut self.store, canvas)
    }

    pub fn pointer_move(&mut self, id: PointerId, p: Point) -> LaminaResult<bool> {
        if self.brush.is_some() {
            return Ok(false);
        }
        self.gestures.pointer_move(id, p, &mut self.store)
    }

    pub fn pointer_up(&mut self, id: PointerId) {
        self.gestures.pointer_up(id);
    }

    pub fn cancel_gestures(&mut self) {
        self.gestures.cancel();
    }
}

fn sanitize_strength(strength: f32) -> f32 {
    if strength.is_finite() {
        strength.clamp(0.0, 100.0)
    } else {
        DEFAULT_SEGMENTATION_STRENGTH
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
