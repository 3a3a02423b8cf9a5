use image::Rgba;

use super::*;
use crate::layer::Geometry;
use crate::render::compile::ShadowSpec;
use crate::text::TextStyle;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas {
        width: w,
        height: h,
    }
}

fn red_square(side: u32, at: (f64, f64)) -> DrawOp {
    let img = Arc::new(RgbaImage::from_pixel(side, side, Rgba([255, 0, 0, 255])));
    DrawOp::prerendered(LayerId(1), 1, img, Affine::translate(at))
}

fn render(surface: &mut Surface, ops: &[DrawOp], background: Option<Rgba8>) {
    let mut text = TextEngine::new();
    CpuCompositor::new()
        .render(surface, ops, background, &mut text)
        .unwrap();
}

#[test]
fn raster_lands_where_the_transform_puts_it() {
    let mut s = Surface::new(canvas(20, 20)).unwrap();
    render(&mut s, &[red_square(10, (5.0, 5.0))], None);
    assert_eq!(s.pixel(10, 10), Some(Rgba8::opaque(255, 0, 0)));
    assert_eq!(s.pixel(2, 2), Some(Rgba8::transparent()));
    assert_eq!(s.pixel(17, 17), Some(Rgba8::transparent()));
}

#[test]
fn opacity_scales_coverage() {
    let mut s = Surface::new(canvas(20, 20)).unwrap();
    let mut op = red_square(10, (5.0, 5.0));
    op.opacity = 0.5;
    render(&mut s, &[op], None);
    let px = s.pixel(10, 10).unwrap();
    assert!((i32::from(px.a) - 128).abs() <= 2, "alpha {}", px.a);
}

#[test]
fn zero_opacity_and_offscreen_ops_draw_nothing() {
    let mut s = Surface::new(canvas(20, 20)).unwrap();
    let mut hidden = red_square(10, (5.0, 5.0));
    hidden.opacity = 0.0;
    render(&mut s, &[hidden, red_square(10, (100.0, 100.0))], None);
    assert!(s.data().iter().all(|&b| b == 0));
}

#[test]
fn background_fills_before_ops() {
    let mut s = Surface::new(canvas(8, 8)).unwrap();
    render(&mut s, &[red_square(4, (0.0, 0.0))], Some(Rgba8::WHITE));
    assert_eq!(s.pixel(7, 7), Some(Rgba8::WHITE));
    assert_eq!(s.pixel(1, 1), Some(Rgba8::opaque(255, 0, 0)));
}

#[test]
fn later_ops_draw_on_top() {
    let mut s = Surface::new(canvas(20, 20)).unwrap();
    let blue = DrawOp::prerendered(
        LayerId(2),
        2,
        Arc::new(RgbaImage::from_pixel(10, 10, Rgba([0, 0, 255, 255]))),
        Affine::translate((5.0, 5.0)),
    );
    render(&mut s, &[red_square(10, (5.0, 5.0)), blue], None);
    assert_eq!(s.pixel(10, 10), Some(Rgba8::opaque(0, 0, 255)));
}

#[test]
fn shadow_darkens_below_content() {
    let mut s = Surface::new(canvas(30, 30)).unwrap();
    let mut op = red_square(10, (10.0, 5.0));
    op.shadow = Some(ShadowSpec {
        offset_y: 4.0,
        blur_px: 2.0,
        opacity: 0.34,
    });
    render(&mut s, &[op], Some(Rgba8::WHITE));

    let below = s.pixel(15, 17).unwrap();
    assert!(below.r < 245, "shadow missing: {below:?}");
    assert_eq!(below.r, below.g);
    assert_eq!(s.pixel(15, 10), Some(Rgba8::opaque(255, 0, 0)));
    assert_eq!(s.pixel(1, 1), Some(Rgba8::WHITE));
}

#[test]
fn text_without_a_font_still_draws_glyph_cells() {
    let c = canvas(400, 200);
    let mut geometry = Geometry::default();
    let mut layer = TextLayer::new(
        "HELLO",
        TextStyle {
            color: Rgba8::opaque(0, 255, 0),
            ..TextStyle::default()
        },
    );
    layer.refit(&mut ApproxMeasure, &mut geometry, c);
    let size = layer.size();
    let op = DrawOp {
        layer: LayerId(5),
        paint: DrawPaint::Text(Box::new(layer)),
        size,
        transform: geometry.transform(c, size, Vec2::ZERO, 1.0),
        opacity: 1.0,
        shadow: None,
    };

    let mut s = Surface::new(c).unwrap();
    render(&mut s, &[op], None);
    let img = s.to_rgba_image().unwrap();
    let green = img
        .pixels()
        .filter(|p| p[3] == 255 && p[1] == 255 && p[0] == 0)
        .count();
    assert!(green > 100, "only {green} glyph pixels");
}

#[test]
fn retain_layers_drops_dead_paints() {
    let mut s = Surface::new(canvas(8, 8)).unwrap();
    let mut text = TextEngine::new();
    let mut cpu = CpuCompositor::new();
    cpu.render(&mut s, &[red_square(4, (0.0, 0.0))], None, &mut text)
        .unwrap();
    assert_eq!(cpu.paints.len(), 1);
    cpu.retain_layers(|id| id != LayerId(1));
    assert!(cpu.paints.is_empty());
}
