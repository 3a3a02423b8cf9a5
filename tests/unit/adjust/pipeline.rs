use image::{Rgba, RgbaImage};

use super::*;

fn swatch() -> RgbaImage {
    RgbaImage::from_fn(4, 4, |x, y| {
        Rgba([
            (x * 60) as u8,
            (y * 60) as u8,
            200,
            if x == 3 { 128 } else { 255 },
        ])
    })
}

#[test]
fn neutral_params_return_identical_pixels() {
    let img = swatch();
    let out = apply_adjustments(&img, &AdjustParams::default()).unwrap();
    assert_eq!(out, img);
}

#[test]
fn alpha_is_never_touched() {
    let img = swatch();
    let params = AdjustParams {
        brightness: 20.0,
        contrast: 15.0,
        retro: RetroStyle::Sepia,
        retro_intensity: 100.0,
        retro_grain: 40.0,
        ..AdjustParams::default()
    };
    let out = apply_adjustments(&img, &params).unwrap();
    for (a, b) in img.pixels().zip(out.pixels()) {
        assert_eq!(a[3], b[3]);
    }
}

#[test]
fn full_desaturation_is_clamped_to_minus_30() {
    let img = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255]));
    let out = apply_adjustments(
        &img,
        &AdjustParams {
            saturation: -100.0,
            ..AdjustParams::default()
        },
    )
    .unwrap();
    let px = out.get_pixel(0, 0);
    // gray = 76.245; r = 76.245 + (255 - 76.245) * 0.7
    assert_eq!(px[0], 201);
    assert_eq!(px[1], 23);
    assert_eq!(px[2], 23);
}

#[test]
fn brightness_offsets_all_channels() {
    let img = RgbaImage::from_pixel(1, 1, Rgba([100, 100, 100, 255]));
    let out = apply_adjustments(
        &img,
        &AdjustParams {
            brightness: 10.0,
            ..AdjustParams::default()
        },
    )
    .unwrap();
    assert_eq!(out.get_pixel(0, 0).0, [126, 126, 126, 255]);
}

#[test]
fn contrast_pivots_at_mid_gray() {
    let img = RgbaImage::from_pixel(1, 1, Rgba([128, 128, 128, 255]));
    let out = apply_adjustments(
        &img,
        &AdjustParams {
            contrast: 30.0,
            ..AdjustParams::default()
        },
    )
    .unwrap();
    assert_eq!(out.get_pixel(0, 0).0, [128, 128, 128, 255]);

    let img = RgbaImage::from_pixel(1, 1, Rgba([228, 28, 128, 255]));
    let out = apply_adjustments(
        &img,
        &AdjustParams {
            contrast: 30.0,
            ..AdjustParams::default()
        },
    )
    .unwrap();
    assert_eq!(out.get_pixel(0, 0).0, [255, 0, 128, 255]);
}

#[test]
fn warm_temperature_raises_red_and_lowers_blue() {
    let img = RgbaImage::from_pixel(1, 1, Rgba([100, 100, 100, 255]));
    let out = apply_adjustments(
        &img,
        &AdjustParams {
            temperature: 20.0,
            ..AdjustParams::default()
        },
    )
    .unwrap();
    assert_eq!(out.get_pixel(0, 0).0, [120, 100, 80, 255]);
}

#[test]
fn bw_retro_produces_gray() {
    let img = swatch();
    let out = apply_adjustments(
        &img,
        &AdjustParams {
            retro: RetroStyle::Bw,
            retro_intensity: 50.0,
            ..AdjustParams::default()
        },
    )
    .unwrap();
    for px in out.pixels() {
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }
}

#[test]
fn sepia_full_intensity_matches_matrix() {
    let img = RgbaImage::from_pixel(1, 1, Rgba([100, 100, 100, 255]));
    let out = apply_adjustments(
        &img,
        &AdjustParams {
            retro: RetroStyle::Sepia,
            retro_intensity: 100.0,
            ..AdjustParams::default()
        },
    )
    .unwrap();
    // rows sum to 1.351, 1.203, 0.937
    assert_eq!(out.get_pixel(0, 0).0, [135, 120, 94, 255]);
}

#[test]
fn grain_is_deterministic() {
    let img = RgbaImage::from_pixel(8, 8, Rgba([120, 120, 120, 255]));
    let params = AdjustParams {
        retro_grain: 80.0,
        ..AdjustParams::default()
    };
    let a = apply_adjustments(&img, &params).unwrap();
    let b = apply_adjustments(&img, &params).unwrap();
    assert_eq!(a, b);
    assert!(a.pixels().any(|px| px[0] != 120));
}

#[test]
fn blur_runs_last_and_softens_edges() {
    let img = RgbaImage::from_fn(9, 1, |x, _| {
        if x < 4 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    let out = apply_adjustments(
        &img,
        &AdjustParams {
            blur: 2.0,
            ..AdjustParams::default()
        },
    )
    .unwrap();
    let mid = out.get_pixel(4, 0)[0];
    assert!(mid > 0 && mid < 255);
}
