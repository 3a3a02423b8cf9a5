use std::sync::Arc;

use image::RgbaImage;

use crate::adjust::memo::LayerMemo;
use crate::foundation::core::{Affine, Canvas, LayerId, Rect, Rgba8, Vec2};
use crate::foundation::error::LaminaResult;
use crate::layer::TextLayer;
use crate::raster::blur::{blur_kernel_for_px, blur_rgba8_premul};
use crate::raster::decode::{image_paint, pixmap_from_rgba};
use crate::render::compile::{DrawOp, DrawPaint};
use crate::render::surface::Surface;
use crate::text::{ApproxMeasure, TextEngine};

/// Draws compiled ops onto a [`Surface`] with `vello_cpu`.
///
/// Each op is rasterized into a scratch pixmap covering its clipped canvas bounds, then composited
/// source-over with the op's opacity. Shadows go through the same path as a blurred silhouette.
#[derive(Default)]
pub struct CpuCompositor {
    paints: LayerMemo<vello_cpu::Image>,
    silhouettes: LayerMemo<vello_cpu::Image>,
}

impl std::fmt::Debug for CpuCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuCompositor")
            .field("paints", &self.paints.len())
            .field("silhouettes", &self.silhouettes.len())
            .finish()
    }
}

/// Integer scratch rectangle in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Scratch {
    x: i32,
    y: i32,
    w: u16,
    h: u16,
}

impl CpuCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear (or fill with `background`), then draw `ops` back to front.
    #[tracing::instrument(skip_all, fields(ops = ops.len()))]
    pub fn render(
        &mut self,
        surface: &mut Surface,
        ops: &[DrawOp],
        background: Option<Rgba8>,
        text: &mut TextEngine,
    ) -> LaminaResult<()> {
        match background {
            Some(c) => surface.fill(c),
            None => surface.clear(),
        }
        for op in ops {
            self.draw_op(surface, op, text)?;
        }
        Ok(())
    }

    /// Forget cached paints for layers that no longer exist.
    pub fn retain_layers(&mut self, alive: impl Fn(LayerId) -> bool) {
        self.paints.retain_layers(&alive);
        self.silhouettes.retain_layers(&alive);
    }

    fn draw_op(
        &mut self,
        surface: &mut Surface,
        op: &DrawOp,
        text: &mut TextEngine,
    ) -> LaminaResult<()> {
        if op.opacity <= 0.0 {
            return Ok(());
        }
        let canvas = surface.canvas();

        if let Some(shadow) = op.shadow {
            let transform = Affine::translate((0.0, shadow.offset_y)) * op.transform;
            let (radius, sigma) = blur_kernel_for_px(shadow.blur_px);
            let pad = f64::from(radius) + 1.0;
            if let Some(scratch) = scratch_for(transform, op.size, pad, canvas) {
                let mut pixmap = match &op.paint {
                    DrawPaint::Raster { key, image } => {
                        let paint = self.silhouette_paint(op.layer, *key, image)?;
                        rasterize(scratch, transform, |ctx| fill_paint(ctx, paint, op.size))
                    }
                    DrawPaint::Text(t) => {
                        rasterize(scratch, transform, |ctx| paint_text(ctx, t, text, true))
                    }
                };
                let blurred = blur_rgba8_premul(
                    pixmap.data_as_u8_slice(),
                    u32::from(scratch.w),
                    u32::from(scratch.h),
                    radius,
                    sigma,
                )?;
                pixmap.data_as_u8_slice_mut().copy_from_slice(&blurred);
                surface.draw_pixmap(&pixmap, scratch.x, scratch.y, shadow.opacity * op.opacity)?;
            }
        }

        let Some(scratch) = scratch_for(op.transform, op.size, 1.0, canvas) else {
            return Ok(());
        };
        let pixmap = match &op.paint {
            DrawPaint::Raster { key, image } => {
                let paint = self.raster_paint(op.layer, *key, image)?;
                rasterize(scratch, op.transform, |ctx| fill_paint(ctx, paint, op.size))
            }
            DrawPaint::Text(t) => {
                rasterize(scratch, op.transform, |ctx| paint_text(ctx, t, text, false))
            }
        };
        surface.draw_pixmap(&pixmap, scratch.x, scratch.y, op.opacity)
    }

    fn raster_paint(
        &mut self,
        layer: LayerId,
        key: u64,
        image: &RgbaImage,
    ) -> LaminaResult<Arc<vello_cpu::Image>> {
        self.paints.get_or_try_insert(layer, key, || {
            Ok(image_paint(Arc::new(pixmap_from_rgba(image)?)))
        })
    }

    /// Same coverage as the raster, colors zeroed.
    fn silhouette_paint(
        &mut self,
        layer: LayerId,
        key: u64,
        image: &RgbaImage,
    ) -> LaminaResult<Arc<vello_cpu::Image>> {
        self.silhouettes.get_or_try_insert(layer, key, || {
            let mut dark = image.clone();
            for px in dark.pixels_mut() {
                px[0] = 0;
                px[1] = 0;
                px[2] = 0;
            }
            Ok(image_paint(Arc::new(pixmap_from_rgba(&dark)?)))
        })
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn scratch_for(transform: Affine, size: Vec2, pad: f64, canvas: Canvas) -> Option<Scratch> {
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    let bounds = transform
        .transform_rect_bbox(Rect::new(0.0, 0.0, size.x, size.y))
        .inflate(pad, pad)
        .intersect(Rect::new(
            0.0,
            0.0,
            f64::from(canvas.width),
            f64::from(canvas.height),
        ));
    let (x0, y0) = (bounds.x0.floor(), bounds.y0.floor());
    let (x1, y1) = (bounds.x1.ceil(), bounds.y1.ceil());
    if !(x1 > x0 && y1 > y0) {
        return None;
    }
    Some(Scratch {
        x: x0 as i32,
        y: y0 as i32,
        w: (x1 - x0).min(f64::from(u16::MAX)) as u16,
        h: (y1 - y0).min(f64::from(u16::MAX)) as u16,
    })
}

fn rasterize(
    scratch: Scratch,
    transform: Affine,
    paint: impl FnOnce(&mut vello_cpu::RenderContext),
) -> vello_cpu::Pixmap {
    let mut ctx = vello_cpu::RenderContext::new(scratch.w, scratch.h);
    let local = Affine::translate((-f64::from(scratch.x), -f64::from(scratch.y))) * transform;
    ctx.set_transform(affine_to_cpu(local));
    paint(&mut ctx);
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(scratch.w, scratch.h);
    ctx.render_to_pixmap(&mut pixmap);
    pixmap
}

fn fill_paint(ctx: &mut vello_cpu::RenderContext, paint: Arc<vello_cpu::Image>, size: Vec2) {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(paint.as_ref().clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, size.x, size.y));
}

fn paint_text(
    ctx: &mut vello_cpu::RenderContext,
    layer: &TextLayer,
    text: &mut TextEngine,
    silhouette: bool,
) {
    let style = &layer.style;
    let layout = layer.layout();
    let color = if silhouette { Rgba8::BLACK } else { style.color };
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));

    let font = text.font_data(style.family);
    let size = layout.size;
    for (i, line) in layout.lines.iter().enumerate() {
        let x0 = layout.line_x(i, style.align);
        let y0 = i as f32 * layout.line_height + (layout.line_height - size) / 2.0;

        let shaped = font
            .as_ref()
            .and_then(|font| Some((font, text.shape_line(&line.text, style, size)?)));
        if let Some((font, shaped)) = shaped {
            for pl in shaped.lines() {
                for item in pl.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: x0 + g.x,
                        y: y0 + g.y,
                    });
                    ctx.glyph_run(font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
            continue;
        }

        // No registered face: block out each glyph cell with approximate metrics.
        let spacing = style.letter_spacing * size / style.size.max(f32::EPSILON);
        let mut x = x0;
        for c in line.text.chars() {
            let advance = ApproxMeasure::char_advance(c, style, size) + spacing;
            if !c.is_whitespace() {
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    f64::from(x + advance * 0.1),
                    f64::from(y0 + size * 0.15),
                    f64::from(x + advance * 0.9),
                    f64::from(y0 + size * 0.85),
                ));
            }
            x += advance;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
