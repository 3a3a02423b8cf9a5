use image::Rgba;

use super::*;
use crate::foundation::core::Point;
use crate::layer::{ImageLayer, LayerProps};
use crate::mask::AlphaMask;

fn canvas() -> Canvas {
    Canvas {
        width: 200,
        height: 100,
    }
}

fn image_layer(id: u64) -> Layer {
    Layer {
        id: LayerId(id),
        props: LayerProps::default(),
        content: LayerContent::Image(ImageLayer::new(RgbaImage::from_pixel(
            40,
            20,
            Rgba([10, 20, 30, 255]),
        ))),
    }
}

#[test]
fn shadow_parameters_follow_drawn_size() {
    let s = ShadowSpec::for_drawn_size(Vec2::new(400.0, 200.0));
    assert!((s.offset_y - 7.0).abs() < 1e-9);
    assert!((s.blur_px - 8.0).abs() < 1e-6);
    assert_eq!(s.opacity, SHADOW_OPACITY);

    let tiny = ShadowSpec::for_drawn_size(Vec2::new(10.0, 10.0));
    assert_eq!(tiny.offset_y, 2.0);
    assert_eq!(tiny.blur_px, 2.0);

    let huge = ShadowSpec::for_drawn_size(Vec2::new(5000.0, 100.0));
    assert_eq!(huge.blur_px, 24.0);
}

#[test]
fn compile_carries_opacity_and_shadow() {
    let mut layer = image_layer(1);
    layer.props.opacity = 50.0;
    layer.props.shadow = true;
    let mut memo = LayerMemo::new();
    let op = compile_layer(&layer, canvas(), Motion::IDENTITY, &mut memo).unwrap();
    assert_eq!(op.opacity, 0.5);
    assert!(op.shadow.is_some());
    assert_eq!(op.size, Vec2::new(40.0, 20.0));
    assert!(matches!(op.paint, DrawPaint::Raster { .. }));
}

#[test]
fn motion_scales_about_anchor_and_offsets() {
    let layer = image_layer(1);
    let mut memo = LayerMemo::new();
    let motion = Motion {
        offset: Vec2::new(5.0, -5.0),
        scale: 2.0,
    };
    let op = compile_layer(&layer, canvas(), motion, &mut memo).unwrap();
    let center = op.transform * Point::new(20.0, 10.0);
    assert!((center.x - 105.0).abs() < 1e-9 && (center.y - 45.0).abs() < 1e-9);
    let corner = op.transform * Point::new(0.0, 0.0);
    assert!((corner.x - 65.0).abs() < 1e-9);
}

fn set_brightness(layer: &mut Layer, brightness: f32) {
    if let LayerContent::Image(img) = &mut layer.content {
        img.adjust.brightness = brightness;
    }
}

#[test]
fn processed_raster_is_memoized_until_params_change() {
    let mut layer = image_layer(7);
    set_brightness(&mut layer, 10.0);
    let mut memo = LayerMemo::new();
    compile_layer(&layer, canvas(), Motion::IDENTITY, &mut memo).unwrap();
    compile_layer(&layer, canvas(), Motion::IDENTITY, &mut memo).unwrap();
    assert_eq!(memo.stats(), (1, 1));

    set_brightness(&mut layer, 20.0);
    let op = compile_layer(&layer, canvas(), Motion::IDENTITY, &mut memo).unwrap();
    assert_eq!(memo.stats(), (1, 2));
    let DrawPaint::Raster { image, .. } = op.paint else {
        panic!("expected raster paint");
    };
    assert!(image.get_pixel(0, 0)[0] > 10);
}

#[test]
fn neutral_unmasked_layer_skips_memo() {
    let layer = image_layer(4);
    let mut memo = LayerMemo::new();
    let op = compile_layer(&layer, canvas(), Motion::IDENTITY, &mut memo).unwrap();
    assert!(memo.is_empty());
    assert_eq!(memo.stats(), (0, 0));
    let (DrawPaint::Raster { image, .. }, LayerContent::Image(img)) = (op.paint, &layer.content)
    else {
        panic!("expected image raster");
    };
    assert!(Arc::ptr_eq(&image, &img.shared_base()));
}

#[test]
fn masked_layer_is_memoized_even_when_neutral() {
    let mut layer = image_layer(5);
    if let LayerContent::Image(img) = &mut layer.content {
        let mut data = vec![255; 40 * 20];
        data[0] = 0;
        img.set_mask(AlphaMask::from_raw(40, 20, data).unwrap()).unwrap();
    }
    let mut memo = LayerMemo::new();
    let op = compile_layer(&layer, canvas(), Motion::IDENTITY, &mut memo).unwrap();
    assert_eq!(memo.len(), 1);
    let DrawPaint::Raster { image, .. } = op.paint else {
        panic!("expected raster paint");
    };
    assert_eq!(image.get_pixel(0, 0)[3], 0);
    assert_eq!(image.get_pixel(1, 0)[3], 255);
}

#[test]
fn compile_layers_pairs_motions_by_index() {
    let a = image_layer(1);
    let b = image_layer(2);
    let mut memo = LayerMemo::new();
    let motions = [Motion::IDENTITY];
    let ops = compile_layers(&[&a, &b], canvas(), &motions, &mut memo).unwrap();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[1].transform, ops[0].transform);
}

#[test]
fn prerendered_op_has_no_shadow() {
    let img = Arc::new(RgbaImage::new(8, 4));
    let op = DrawOp::prerendered(LayerId(3), 9, img, Affine::IDENTITY);
    assert!(op.shadow.is_none());
    assert_eq!(op.opacity, 1.0);
    assert_eq!(op.size, Vec2::new(8.0, 4.0));
}
