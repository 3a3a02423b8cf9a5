//! Parallax synthesis.
//!
//! Every rendered layer gets a depth rank `d = (i + 1) / n` (back to front) and moves in
//! proportion to it, so farther-back layers move less. Each layer is rasterized once into a
//! padded buffer and only that buffer is scaled/translated per frame.

use std::sync::Arc;
use std::sync::mpsc::Sender;

use image::RgbaImage;
use image::imageops::FilterType;

use crate::encode::sink::{FrameSink, QualityPreset, SinkConfig};
use crate::foundation::core::{Affine, Canvas, LayerId, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{LaminaError, LaminaResult};
use crate::foundation::math::Fnv1a64;
use crate::layer::Layer;
use crate::render::compile::{DrawOp, Motion};
use crate::render::pipeline::Renderer;
use crate::render::surface::Surface;

/// Zoom gain at full intensity, depth and progress.
pub const MAX_ZOOM: f64 = 0.16;
/// Pan amplitude as a fraction of the canvas dimension.
pub const PAN_FACTOR: f64 = 0.06;
/// Padding around each pre-rasterized layer, as a fraction of its drawn size.
pub const TRIM_MARGIN: f64 = 0.12;
pub const MIN_FRAMES: u32 = 2;
pub const MAX_FRAMES: u32 = 600;

const MAX_DURATION_SEC: f32 = 20.0;
const FPS_RANGE: (u32, u32) = (1, 60);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionType {
    #[default]
    Zoom,
    PanX,
    PanY,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    /// Out and back: progress rises to 1 at the midpoint and returns to 0.
    #[default]
    PingPong,
    Forward,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ParallaxOpts {
    pub duration_sec: f32,
    pub fps: u32,
    /// `0..=1`.
    pub intensity: f32,
    pub motion: MotionType,
    pub loop_mode: LoopMode,
    /// Keep the topmost rendered layer still.
    pub lock_top: bool,
    pub quality: QualityPreset,
    /// `0` loops forever.
    pub loop_count: u16,
}

impl Default for ParallaxOpts {
    fn default() -> Self {
        Self {
            duration_sec: 3.0,
            fps: 15,
            intensity: 0.6,
            motion: MotionType::Zoom,
            loop_mode: LoopMode::PingPong,
            lock_top: false,
            quality: QualityPreset::Standard,
            loop_count: 0,
        }
    }
}

impl ParallaxOpts {
    /// Copy with duration, fps and intensity brought into range; non-finite values take defaults.
    ///
    /// Short durations are kept as given; [`MIN_FRAMES`] bounds the frame count instead.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let duration_sec = if self.duration_sec.is_finite() && self.duration_sec > 0.0 {
            self.duration_sec.min(MAX_DURATION_SEC)
        } else {
            d.duration_sec
        };
        let intensity = if self.intensity.is_finite() {
            self.intensity.clamp(0.0, 1.0)
        } else {
            d.intensity
        };
        Self {
            duration_sec,
            fps: self.fps.clamp(FPS_RANGE.0, FPS_RANGE.1),
            intensity,
            ..self
        }
    }

    pub fn frame_count(&self) -> u32 {
        let n = (f64::from(self.duration_sec) * f64::from(self.fps)).round();
        if n.is_finite() {
            (n.max(0.0) as u32).clamp(MIN_FRAMES, MAX_FRAMES)
        } else {
            MIN_FRAMES
        }
    }

    pub fn frame_delay_ms(&self) -> u32 {
        (1000.0 / f64::from(self.fps.max(1))).round() as u32
    }
}

/// Motion progress in `[0, 1]` for frame `i` of `n`.
pub fn progress_at(i: u32, n: u32, mode: LoopMode) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let t = (f64::from(i) / f64::from(n - 1)).clamp(0.0, 1.0);
    match mode {
        LoopMode::PingPong if t <= 0.5 => 2.0 * t,
        LoopMode::PingPong => 2.0 * (1.0 - t),
        LoopMode::Forward => t,
    }
}

/// Depth rank of the `rank`-th of `count` rendered layers (back to front).
pub fn depth(rank: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (rank + 1) as f64 / count as f64
}

/// Motion of the `rank`-th of `count` rendered layers at progress `p`.
pub fn layer_motion(
    opts: &ParallaxOpts,
    rank: usize,
    count: usize,
    p: f64,
    canvas: Canvas,
) -> Motion {
    if opts.lock_top && count > 0 && rank + 1 == count {
        return Motion::IDENTITY;
    }
    let amount = f64::from(opts.intensity) * depth(rank, count);
    match opts.motion {
        MotionType::Zoom => Motion {
            offset: Vec2::ZERO,
            scale: 1.0 + MAX_ZOOM * amount * p,
        },
        MotionType::PanX => Motion {
            offset: Vec2::new(pan_offset(canvas.width, amount, p), 0.0),
            scale: 1.0,
        },
        MotionType::PanY => Motion {
            offset: Vec2::new(0.0, pan_offset(canvas.height, amount, p)),
            scale: 1.0,
        },
    }
}

fn pan_offset(dim: u32, amount: f64, p: f64) -> f64 {
    f64::from(dim) * PAN_FACTOR * amount * (2.0 * p - 1.0)
}

pub fn motions_at(opts: &ParallaxOpts, count: usize, p: f64, canvas: Canvas) -> Vec<Motion> {
    (0..count)
        .map(|rank| layer_motion(opts, rank, count, p, canvas))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Render,
    Encode,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    pub stage: Stage,
    /// `[0, 1]` within the stage.
    pub progress: f32,
}

fn report(tx: Option<&Sender<Progress>>, stage: Stage, progress: f32) {
    if let Some(tx) = tx {
        // A dropped receiver only means nobody is listening.
        let _ = tx.send(Progress { stage, progress });
    }
}

/// A layer flattened (opacity and shadow included) into a padded buffer.
#[derive(Clone, Debug)]
struct Prerendered {
    layer: LayerId,
    key: u64,
    image: Arc<RgbaImage>,
    /// Canvas position of the buffer's top-left corner.
    origin: Vec2,
    /// Point the layer scales about.
    anchor: Point,
}

impl Prerendered {
    fn op(&self, motion: Motion) -> DrawOp {
        let transform = Affine::translate(self.anchor.to_vec2() + motion.offset)
            * Affine::scale(motion.scale)
            * Affine::translate(self.origin - self.anchor.to_vec2());
        DrawOp::prerendered(self.layer, self.key, Arc::clone(&self.image), transform)
    }
}

fn drawn_bounds(op: &DrawOp) -> Rect {
    let mut bounds = op
        .transform
        .transform_rect_bbox(Rect::new(0.0, 0.0, op.size.x, op.size.y));
    if let Some(shadow) = op.shadow {
        let spread = f64::from(shadow.blur_px) * 3.0;
        let shadow_bounds = bounds + Vec2::new(0.0, shadow.offset_y);
        bounds = bounds.union(shadow_bounds.inflate(spread, spread));
    }
    bounds
}

/// Static-layout region a layer's buffer must cover so that every frame of the loop fills the
/// canvas the same way the live layer would.
///
/// Motions are monotonic in progress, so mapping the canvas back through the two extreme motions
/// and taking the bounding box covers every frame in between.
fn needed_region(
    opts: &ParallaxOpts,
    rank: usize,
    count: usize,
    canvas: Canvas,
    anchor: Point,
) -> Rect {
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    let view = Rect::new(0.0, 0.0, w, h);
    let mut region = view;
    for p in [0.0, 1.0] {
        let m = layer_motion(opts, rank, count, p, canvas);
        let to_canvas = Affine::translate(anchor.to_vec2() + m.offset)
            * Affine::scale(m.scale)
            * Affine::translate(-anchor.to_vec2());
        region = region.union(to_canvas.inverse().transform_rect_bbox(view));
    }
    region.inflate(w * TRIM_MARGIN, h * TRIM_MARGIN)
}

fn prerender(
    renderer: &mut Renderer,
    layer: &Layer,
    op: DrawOp,
    region: Rect,
) -> LaminaResult<Option<Prerendered>> {
    let canvas = renderer.canvas();
    let bounds = drawn_bounds(&op);
    let padded = bounds
        .inflate(bounds.width() * TRIM_MARGIN, bounds.height() * TRIM_MARGIN)
        .intersect(region);
    let (x0, y0) = (padded.x0.floor(), padded.y0.floor());
    let (x1, y1) = (padded.x1.ceil(), padded.y1.ceil());
    if !(x1 > x0 && y1 > y0) {
        return Ok(None);
    }

    let origin = Vec2::new(x0, y0);
    let mut scratch = Surface::new(Canvas {
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    })?;
    let shifted = DrawOp {
        transform: Affine::translate(-origin) * op.transform,
        ..op
    };
    renderer.render_ops_into(&mut scratch, std::slice::from_ref(&shifted))?;
    let image = scratch.to_rgba_image()?;

    let mut h = Fnv1a64::new_default();
    h.write_bytes(b"parallax");
    h.write_u64(layer.id.0);
    h.write_u64(origin.x.to_bits());
    h.write_u64(origin.y.to_bits());
    h.write_bytes(image.as_raw());

    Ok(Some(Prerendered {
        layer: layer.id,
        key: h.finish(),
        image: Arc::new(image),
        origin,
        anchor: layer.props.geometry.anchor(canvas),
    }))
}

/// Render and encode a parallax loop of `layers` (back to front).
///
/// The live surface is used as scratch and restored afterwards, on success and on failure.
#[tracing::instrument(skip_all, fields(layers = layers.len(), motion = ?opts.motion))]
pub fn synthesize(
    renderer: &mut Renderer,
    layers: &[&Layer],
    background: Option<Rgba8>,
    opts: &ParallaxOpts,
    sink: &mut dyn FrameSink,
    progress: Option<&Sender<Progress>>,
) -> LaminaResult<Vec<u8>> {
    if layers.is_empty() {
        return Err(LaminaError::empty_composition(
            "parallax export needs at least one visible layer",
        ));
    }
    let snapshot = renderer.surface.snapshot();
    let opts = opts.sanitized();
    let result = synthesize_frames(renderer, layers, background, &opts, sink, progress);
    renderer.surface.restore(&snapshot)?;
    if let Err(e) = &result {
        tracing::warn!(error = %e, "parallax synthesis failed");
    }
    result
}

fn synthesize_frames(
    renderer: &mut Renderer,
    layers: &[&Layer],
    background: Option<Rgba8>,
    opts: &ParallaxOpts,
    sink: &mut dyn FrameSink,
    progress: Option<&Sender<Progress>>,
) -> LaminaResult<Vec<u8>> {
    let canvas = renderer.canvas();
    let out = canvas.scaled(opts.quality.scale());
    let n = opts.frame_count();
    let delay = opts.frame_delay_ms();
    tracing::info!(
        frames = n,
        width = out.width,
        height = out.height,
        "parallax synthesis started"
    );

    // (rank, buffer); layers that land entirely off-canvas are skipped but keep their rank.
    let ops = renderer.compile(layers, &[])?;
    let mut buffers = Vec::with_capacity(layers.len());
    for (rank, (layer, op)) in layers.iter().zip(ops).enumerate() {
        let anchor = layer.props.geometry.anchor(canvas);
        let region = needed_region(opts, rank, layers.len(), canvas, anchor);
        if let Some(pre) = prerender(renderer, layer, op, region)? {
            buffers.push((rank, pre));
        }
    }

    sink.begin(SinkConfig {
        width: out.width,
        height: out.height,
        quality: opts.quality,
        loop_count: opts.loop_count,
    })?;

    for i in 0..n {
        let p = progress_at(i, n, opts.loop_mode);
        let frame_ops: Vec<DrawOp> = buffers
            .iter()
            .map(|(rank, pre)| pre.op(layer_motion(opts, *rank, layers.len(), p, canvas)))
            .collect();
        renderer.render_ops(&frame_ops, background)?;
        let frame = renderer.surface.to_rgba_image()?;
        let frame = if out == canvas {
            frame
        } else {
            image::imageops::resize(&frame, out.width, out.height, FilterType::Triangle)
        };
        sink.push_frame(&frame, delay)?;
        report(progress, Stage::Render, (i + 1) as f32 / n as f32);
    }

    let bytes = sink.finish(&mut |p| report(progress, Stage::Encode, p))?;
    report(progress, Stage::Encode, 1.0);
    tracing::info!(bytes = bytes.len(), "parallax synthesis finished");
    Ok(bytes)
}

/// One frame at progress `p`, drawn from the live layers with the same motion as export.
///
/// The live surface is restored afterwards.
pub fn preview_frame(
    renderer: &mut Renderer,
    layers: &[&Layer],
    background: Option<Rgba8>,
    opts: &ParallaxOpts,
    p: f64,
) -> LaminaResult<RgbaImage> {
    let opts = opts.sanitized();
    let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
    let motions = motions_at(&opts, layers.len(), p, renderer.canvas());
    let snapshot = renderer.surface.snapshot();
    let frame = renderer
        .render_frame(layers, &motions, background)
        .and_then(|()| renderer.surface.to_rgba_image());
    renderer.surface.restore(&snapshot)?;
    frame
}

#[cfg(test)]
#[path = "../../tests/unit/animate/parallax.rs"]
mod tests;
