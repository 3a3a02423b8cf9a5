use std::sync::mpsc;

use image::Rgba;

use super::*;
use crate::encode::sink::InMemorySink;
use crate::layer::{ImageLayer, LayerContent, LayerProps};

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas {
        width: w,
        height: h,
    }
}

fn square(id: u64, side: u32, px: [u8; 4]) -> Layer {
    Layer {
        id: LayerId(id),
        props: LayerProps::default(),
        content: LayerContent::Image(ImageLayer::new(RgbaImage::from_pixel(side, side, Rgba(px)))),
    }
}

fn opts(motion: MotionType) -> ParallaxOpts {
    ParallaxOpts {
        duration_sec: 0.5,
        fps: 6,
        intensity: 1.0,
        motion,
        quality: QualityPreset::High,
        ..ParallaxOpts::default()
    }
}

#[test]
fn frame_count_rounds_and_clamps() {
    assert_eq!(ParallaxOpts::default().frame_count(), 45);
    let two_sec = ParallaxOpts {
        duration_sec: 2.0,
        fps: 15,
        ..ParallaxOpts::default()
    };
    assert_eq!(two_sec.frame_count(), 30);
    let tiny = ParallaxOpts {
        duration_sec: 0.05,
        ..ParallaxOpts::default()
    };
    assert_eq!(tiny.frame_count(), MIN_FRAMES);
    let long = ParallaxOpts {
        duration_sec: 20.0,
        fps: 60,
        ..ParallaxOpts::default()
    };
    assert_eq!(long.frame_count(), MAX_FRAMES);
    assert_eq!(ParallaxOpts::default().frame_delay_ms(), 67);
}

#[test]
fn sanitized_clamps_inputs() {
    let o = ParallaxOpts {
        duration_sec: f32::NAN,
        fps: 500,
        intensity: 4.0,
        ..ParallaxOpts::default()
    }
    .sanitized();
    assert_eq!(o.duration_sec, 3.0);
    assert_eq!(o.fps, 60);
    assert_eq!(o.intensity, 1.0);

    let long = ParallaxOpts {
        duration_sec: 90.0,
        ..ParallaxOpts::default()
    }
    .sanitized();
    assert_eq!(long.duration_sec, 20.0);
}

#[test]
fn short_loops_keep_requested_duration() {
    let o = ParallaxOpts {
        duration_sec: 0.2,
        fps: 15,
        ..ParallaxOpts::default()
    }
    .sanitized();
    assert_eq!(o.duration_sec, 0.2);
    assert_eq!(o.frame_count(), 3);

    let zero = ParallaxOpts {
        duration_sec: 0.0,
        ..ParallaxOpts::default()
    }
    .sanitized();
    assert_eq!(zero.duration_sec, 3.0);
}

#[test]
fn ping_pong_returns_to_rest() {
    let n = 30;
    assert_eq!(progress_at(0, n, LoopMode::PingPong), 0.0);
    assert!(progress_at(n - 1, n, LoopMode::PingPong).abs() < 1e-12);
    assert!(progress_at(15, n, LoopMode::PingPong) > 0.95);
    assert_eq!(progress_at(15, 31, LoopMode::PingPong), 1.0);
    assert_eq!(progress_at(n - 1, n, LoopMode::Forward), 1.0);
    assert_eq!(progress_at(0, 1, LoopMode::Forward), 0.0);
}

#[test]
fn zoom_grows_with_depth() {
    let o = opts(MotionType::Zoom);
    let c = canvas(1920, 1080);
    let back = layer_motion(&o, 0, 2, 1.0, c);
    let front = layer_motion(&o, 1, 2, 1.0, c);
    assert!((back.scale - 1.08).abs() < 1e-12);
    assert!((front.scale - 1.16).abs() < 1e-12);
    assert_eq!(back.offset, Vec2::ZERO);
    assert_eq!(layer_motion(&o, 1, 2, 0.0, c), Motion::IDENTITY);
}

#[test]
fn lock_top_exempts_front_layer() {
    let o = ParallaxOpts {
        lock_top: true,
        ..opts(MotionType::Zoom)
    };
    let c = canvas(100, 100);
    assert_eq!(layer_motion(&o, 2, 3, 1.0, c), Motion::IDENTITY);
    assert!(layer_motion(&o, 1, 3, 1.0, c).scale > 1.0);
}

#[test]
fn pan_sweeps_through_rest_at_midpoint() {
    let c = canvas(1000, 500);
    let x = opts(MotionType::PanX);
    assert!((layer_motion(&x, 0, 1, 1.0, c).offset.x - 60.0).abs() < 1e-9);
    assert!((layer_motion(&x, 0, 1, 0.0, c).offset.x + 60.0).abs() < 1e-9);
    assert_eq!(layer_motion(&x, 0, 1, 0.5, c).offset, Vec2::ZERO);
    let y = opts(MotionType::PanY);
    let m = layer_motion(&y, 0, 2, 1.0, c);
    assert!((m.offset.y - 15.0).abs() < 1e-9);
    assert_eq!(m.offset.x, 0.0);
}

#[test]
fn synthesize_streams_frames_and_restores_live_view() {
    let mut r = Renderer::new(canvas(40, 40)).unwrap();
    r.surface.fill(Rgba8::WHITE);
    let back = square(1, 20, [255, 0, 0, 255]);
    let front = square(2, 6, [0, 0, 255, 255]);
    let layers = [&back, &front];

    let (tx, rx) = mpsc::channel();
    let mut sink = InMemorySink::new();
    let o = opts(MotionType::Zoom);
    synthesize(&mut r, &layers, None, &o, &mut sink, Some(&tx)).unwrap();

    assert_eq!(r.surface.pixel(0, 0), Some(Rgba8::WHITE));
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (40, 40));
    assert_eq!(sink.frames().len(), 3);
    assert_eq!(sink.frames()[0].1, 167);

    let events: Vec<Progress> = rx.try_iter().collect();
    assert_eq!(
        events.iter().filter(|e| e.stage == Stage::Render).count(),
        3
    );
    assert_eq!(
        events.last(),
        Some(&Progress {
            stage: Stage::Encode,
            progress: 1.0
        })
    );
}

#[test]
fn first_frame_matches_static_composite() {
    let mut r = Renderer::new(canvas(40, 40)).unwrap();
    let mut back = square(1, 20, [200, 40, 10, 255]);
    back.props.opacity = 60.0;
    back.props.geometry.scale = 1.2;
    let front = square(2, 8, [0, 90, 255, 255]);
    let layers = [&back, &front];

    r.render_frame(&layers, &[], Some(Rgba8::BLACK)).unwrap();
    let still = r.surface.to_rgba_image().unwrap();

    let mut sink = InMemorySink::new();
    synthesize(&mut r, &layers, Some(Rgba8::BLACK), &opts(MotionType::Zoom), &mut sink, None)
        .unwrap();
    let first = &sink.frames()[0].0;
    for (a, b) in still.pixels().zip(first.pixels()) {
        for c in 0..4 {
            assert!((i32::from(a[c]) - i32::from(b[c])).abs() <= 3, "{a:?} vs {b:?}");
        }
    }
}

#[test]
fn midpoint_frame_shows_zoomed_background() {
    let mut r = Renderer::new(canvas(40, 40)).unwrap();
    let back = square(1, 20, [255, 0, 0, 255]);
    let mut sink = InMemorySink::new();
    synthesize(&mut r, &[&back], None, &opts(MotionType::Zoom), &mut sink, None).unwrap();

    let rest = &sink.frames()[0].0;
    let peak = &sink.frames()[1].0;
    assert_eq!(rest.get_pixel(9, 20)[3], 0);
    assert!(peak.get_pixel(9, 20)[3] > 200);
    assert!(peak.get_pixel(9, 20)[0] > 200);
}

#[test]
fn zoom_about_offscreen_anchor_matches_preview() {
    let mut r = Renderer::new(canvas(200, 200)).unwrap();
    let mut strip = Layer {
        id: LayerId(1),
        props: LayerProps::default(),
        content: LayerContent::Image(ImageLayer::new(RgbaImage::from_pixel(
            1600,
            40,
            Rgba([30, 160, 90, 255]),
        ))),
    };
    // Anchor sits at x = -500, far left of the canvas; the strip still spans the whole width.
    strip.props.geometry.x = -600.0;
    let o = ParallaxOpts {
        loop_mode: LoopMode::Forward,
        ..opts(MotionType::Zoom)
    };

    let mut sink = InMemorySink::new();
    synthesize(&mut r, &[&strip], None, &o, &mut sink, None).unwrap();
    let last = &sink.frames().last().unwrap().0;
    let preview = preview_frame(&mut r, &[&strip], None, &o, 1.0).unwrap();

    for x in 0..200 {
        assert_eq!(preview.get_pixel(x, 100)[3], 255, "preview x={x}");
        assert_eq!(last.get_pixel(x, 100)[3], 255, "export x={x}");
    }
}

#[test]
fn draft_quality_halves_frames() {
    let mut r = Renderer::new(canvas(40, 20)).unwrap();
    let back = square(1, 10, [0, 255, 0, 255]);
    let mut sink = InMemorySink::new();
    let o = ParallaxOpts {
        quality: QualityPreset::Draft,
        ..opts(MotionType::PanX)
    };
    synthesize(&mut r, &[&back], None, &o, &mut sink, None).unwrap();
    assert_eq!(sink.frames()[0].0.dimensions(), (20, 10));
}

#[test]
fn nothing_visible_is_refused() {
    let mut r = Renderer::new(canvas(10, 10)).unwrap();
    let mut sink = InMemorySink::new();
    let err = synthesize(&mut r, &[], None, &ParallaxOpts::default(), &mut sink, None).unwrap_err();
    assert!(matches!(err, LaminaError::EmptyComposition(_)));
    assert!(sink.config().is_none());
}

struct AbortingSink;

impl FrameSink for AbortingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> LaminaResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, _frame: &RgbaImage, _delay_ms: u32) -> LaminaResult<()> {
        Err(LaminaError::encode_aborted("cancelled by caller"))
    }

    fn finish(&mut self, _progress: &mut dyn FnMut(f32)) -> LaminaResult<Vec<u8>> {
        Ok(Vec::new())
    }
}

#[test]
fn encoder_abort_rejects_and_restores() {
    let mut r = Renderer::new(canvas(20, 20)).unwrap();
    r.surface.fill(Rgba8::opaque(1, 2, 3));
    let back = square(1, 10, [255, 255, 255, 255]);
    let err = synthesize(&mut r, &[&back], None, &opts(MotionType::Zoom), &mut AbortingSink, None)
        .unwrap_err();
    assert!(matches!(err, LaminaError::EncodeAborted(_)));
    assert_eq!(r.surface.pixel(10, 10), Some(Rgba8::opaque(1, 2, 3)));
}

#[test]
fn preview_uses_export_motion_and_restores() {
    let mut r = Renderer::new(canvas(40, 40)).unwrap();
    let back = square(1, 20, [255, 0, 0, 255]);
    let frame = preview_frame(&mut r, &[&back], None, &opts(MotionType::Zoom), 1.0).unwrap();
    assert!(frame.get_pixel(9, 20)[3] > 200);
    assert_eq!(r.surface.pixel(20, 20), Some(Rgba8::transparent()));
}
