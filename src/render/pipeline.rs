use image::RgbaImage;

use crate::adjust::memo::LayerMemo;
use crate::foundation::core::{Canvas, LayerId, Rgba8};
use crate::foundation::error::LaminaResult;
use crate::layer::Layer;
use crate::render::compile::{DrawOp, Motion, compile_layers};
use crate::render::cpu::CpuCompositor;
use crate::render::surface::Surface;
use crate::text::TextEngine;

/// Compile + draw in one place.
///
/// Owns the live surface together with everything a frame needs: the CPU compositor and its paint
/// caches, the text engine, and the processed-raster memo shared by live rendering, merge and
/// parallax synthesis.
#[derive(Debug)]
pub struct Renderer {
    pub(crate) surface: Surface,
    pub(crate) compositor: CpuCompositor,
    pub(crate) text: TextEngine,
    pub(crate) processed: LayerMemo<RgbaImage>,
}

impl Renderer {
    pub fn new(canvas: Canvas) -> LaminaResult<Self> {
        Ok(Self {
            surface: Surface::new(canvas)?,
            compositor: CpuCompositor::new(),
            text: TextEngine::new(),
            processed: LayerMemo::new(),
        })
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn canvas(&self) -> Canvas {
        self.surface.canvas()
    }

    pub fn text(&self) -> &TextEngine {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut TextEngine {
        &mut self.text
    }

    pub fn resize(&mut self, canvas: Canvas) -> LaminaResult<()> {
        self.surface.resize(canvas)
    }

    /// Render `layers` (back to front) with per-layer `motions` onto the live surface.
    pub fn render_frame(
        &mut self,
        layers: &[&Layer],
        motions: &[Motion],
        background: Option<Rgba8>,
    ) -> LaminaResult<()> {
        let ops = self.compile(layers, motions)?;
        self.render_ops(&ops, background)
    }

    pub fn compile(&mut self, layers: &[&Layer], motions: &[Motion]) -> LaminaResult<Vec<DrawOp>> {
        compile_layers(layers, self.surface.canvas(), motions, &mut self.processed)
    }

    pub fn render_ops(&mut self, ops: &[DrawOp], background: Option<Rgba8>) -> LaminaResult<()> {
        self.compositor
            .render(&mut self.surface, ops, background, &mut self.text)
    }

    /// Draw `ops` onto a separate surface, leaving the live one untouched.
    pub fn render_ops_into(&mut self, target: &mut Surface, ops: &[DrawOp]) -> LaminaResult<()> {
        self.compositor.render(target, ops, None, &mut self.text)
    }

    /// Drop memoized rasters and paints of layers that no longer exist.
    pub fn forget_dead(&mut self, alive: impl Fn(LayerId) -> bool) {
        self.processed.retain_layers(&alive);
        self.compositor.retain_layers(&alive);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
