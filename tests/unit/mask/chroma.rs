use image::{Rgba, RgbaImage};

use super::*;

fn green_keyer() -> ChromaKeyer {
    ChromaKeyer::new(ChromaParams::default())
}

/// Fully saturated, full-value color at hue `h` in `[0, 120]`.
fn hue_color(h: f32) -> (u8, u8, u8) {
    if h <= 60.0 {
        (255, (255.0 * h / 60.0).round() as u8, 0)
    } else {
        ((255.0 * (120.0 - h) / 60.0).round() as u8, 255, 0)
    }
}

#[test]
fn pure_key_is_cut_and_opposite_is_kept() {
    let k = green_keyer();
    assert!((k.strength(0, 255, 0) - 1.0).abs() < 1e-6);
    assert_eq!(k.alpha_for_strength(k.strength(0, 255, 0)), 0);
    assert_eq!(k.strength(255, 0, 0), 0.0);
    assert_eq!(k.alpha_for_strength(0.0), 255);
}

#[test]
fn dark_and_gray_pixels_are_not_keyed() {
    let k = green_keyer();
    assert_eq!(k.strength(0, 10, 0), 0.0);
    assert_eq!(k.strength(128, 128, 128), 0.0);
}

#[test]
fn strength_is_symmetric_under_red_blue_swap() {
    let k = green_keyer();
    for (r, g, b) in [
        (10u8, 200u8, 60u8),
        (90, 180, 30),
        (0, 255, 128),
        (120, 140, 10),
        (200, 90, 40),
    ] {
        let a = k.strength(r, g, b);
        let s = k.strength(b, g, r);
        assert!((a - s).abs() < 1e-4, "({r},{g},{b}): {a} vs {s}");
    }
}

#[test]
fn strength_increases_toward_key_hue() {
    let k = green_keyer();
    let mut prev = -1.0f32;
    for step in 0..=60 {
        let h = step as f32 * 2.0;
        let (r, g, b) = hue_color(h);
        let s = k.strength(r, g, b);
        assert!(s + 1e-6 >= prev, "hue {h}: {s} < {prev}");
        prev = s;
    }
    assert!(prev > 0.99);
}

#[test]
fn mid_band_is_heavily_attenuated() {
    let k = green_keyer();
    let a = k.alpha_for_strength(0.4);
    assert_eq!(a, 23);
    assert_eq!(k.alpha_for_strength(0.275), 51);
    assert_eq!(k.alpha_for_strength(0.2), 255);
    assert_eq!(k.alpha_for_strength(0.5), 0);
}

#[test]
fn build_mask_matches_per_pixel_scoring() {
    let img = RgbaImage::from_fn(2, 1, |x, _| {
        if x == 0 {
            Rgba([0, 255, 0, 255])
        } else {
            Rgba([200, 30, 30, 255])
        }
    });
    let (mask, strengths) = green_keyer().build_mask(&img);
    assert_eq!(mask.data(), &[0, 255]);
    assert_eq!(strengths.len(), 2);
}

#[test]
fn despill_pulls_green_toward_other_channels() {
    let k = green_keyer();
    let mut img = RgbaImage::from_pixel(1, 1, Rgba([100, 200, 90, 255]));
    let (_, strengths) = k.build_mask(&img);
    k.despill_in_place(&mut img, &strengths);
    let g = img.get_pixel(0, 0)[1];
    assert!((100..110).contains(&g), "g={g}");
    assert_eq!(img.get_pixel(0, 0)[0], 100);
}

#[test]
fn despill_leaves_unkeyed_pixels_alone() {
    let k = green_keyer();
    let mut img = RgbaImage::from_pixel(1, 1, Rgba([220, 40, 30, 255]));
    let before = img.clone();
    let (_, strengths) = k.build_mask(&img);
    k.despill_in_place(&mut img, &strengths);
    assert_eq!(img, before);
}

#[test]
fn sampled_key_cuts_matching_background() {
    let k = ChromaKeyer::new(ChromaParams::sampled(Rgba8::opaque(240, 240, 240)));
    assert_eq!(k.alpha_for_strength(k.strength(240, 240, 240)), 0);
    assert_eq!(k.alpha_for_strength(k.strength(20, 20, 20)), 255);
}

#[test]
fn sampled_gray_key_skips_despill() {
    let k = ChromaKeyer::new(ChromaParams::sampled(Rgba8::opaque(240, 240, 240)));
    let mut img = RgbaImage::from_pixel(1, 1, Rgba([238, 250, 236, 255]));
    let before = img.clone();
    let (_, strengths) = k.build_mask(&img);
    k.despill_in_place(&mut img, &strengths);
    assert_eq!(img, before);
}

#[test]
fn blue_hue_key_targets_blue_channel() {
    let k = ChromaKeyer::new(ChromaParams {
        reference: KeyReference::Hue(240.0),
        ..ChromaParams::default()
    });
    assert!(k.strength(0, 0, 255) > 0.99);
    assert_eq!(k.strength(0, 255, 0), 0.0);
}
