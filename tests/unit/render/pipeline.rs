use image::Rgba;

use super::*;
use crate::layer::{ImageLayer, LayerContent, LayerProps};

fn layer(id: u64, px: [u8; 4]) -> Layer {
    Layer {
        id: LayerId(id),
        props: LayerProps::default(),
        content: LayerContent::Image(ImageLayer::new(RgbaImage::from_pixel(4, 4, Rgba(px)))),
    }
}

#[test]
fn render_frame_draws_centered_layers() {
    let mut r = Renderer::new(Canvas {
        width: 8,
        height: 8,
    })
    .unwrap();
    let a = layer(1, [255, 0, 0, 255]);
    r.render_frame(&[&a], &[], Some(Rgba8::BLACK)).unwrap();
    assert_eq!(r.surface().pixel(4, 4), Some(Rgba8::opaque(255, 0, 0)));
    assert_eq!(r.surface().pixel(0, 0), Some(Rgba8::BLACK));
}

#[test]
fn forget_dead_prunes_memo() {
    let mut r = Renderer::new(Canvas {
        width: 8,
        height: 8,
    })
    .unwrap();
    let mut a = layer(1, [255, 0, 0, 255]);
    let mut b = layer(2, [0, 255, 0, 255]);
    for l in [&mut a, &mut b] {
        if let LayerContent::Image(img) = &mut l.content {
            img.adjust.brightness = 10.0;
        }
    }
    r.render_frame(&[&a, &b], &[], None).unwrap();
    assert_eq!(r.processed.len(), 2);
    r.forget_dead(|id| id == LayerId(2));
    assert_eq!(r.processed.len(), 1);
}

#[test]
fn render_ops_into_leaves_live_surface() {
    let mut r = Renderer::new(Canvas {
        width: 8,
        height: 8,
    })
    .unwrap();
    let a = layer(1, [0, 0, 255, 255]);
    let ops = r.compile(&[&a], &[]).unwrap();
    let mut scratch = Surface::new(r.canvas()).unwrap();
    r.render_ops_into(&mut scratch, &ops).unwrap();
    assert_eq!(scratch.pixel(4, 4), Some(Rgba8::opaque(0, 0, 255)));
    assert_eq!(r.surface().pixel(4, 4), Some(Rgba8::transparent()));
}
