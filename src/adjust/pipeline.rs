use image::RgbaImage;

use crate::adjust::color::luma;
use crate::adjust::params::{AdjustParams, RetroStyle};
use crate::foundation::error::LaminaResult;
use crate::foundation::math::{SplitMix64, clamp_u8};
use crate::raster::blur::blur_straight;

/// Fixed grain seed so identical inputs always produce identical pixels.
const GRAIN_SEED: u64 = 0x6C61_6D69_6E61_0001;
/// Peak grain amplitude in 0..=255 levels at grain 100.
const GRAIN_MAX_AMPLITUDE: f32 = 48.0;

const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Apply the adjustment stages in order: retro, temperature/tint, saturation, brightness,
/// contrast, grain, then blur over the finished buffer. Alpha is left untouched.
pub fn apply_adjustments(src: &RgbaImage, params: &AdjustParams) -> LaminaResult<RgbaImage> {
    let p = params.clamped();
    if p.is_neutral() {
        return Ok(src.clone());
    }

    let retro_i = if p.retro == RetroStyle::None {
        0.0
    } else {
        p.retro_intensity / 100.0
    };
    let temp = p.temperature / 100.0;
    let tint = p.tint / 100.0;
    let sat = 1.0 + p.saturation / 100.0;
    let bright = p.brightness / 100.0 * 255.0;
    let contrast = 1.0 + p.contrast / 100.0;
    let grain_amp = p.retro_grain / 100.0 * GRAIN_MAX_AMPLITUDE;

    let mut out = src.clone();
    let mut rng = SplitMix64::new(GRAIN_SEED);
    for px in out.pixels_mut() {
        let mut c = [f32::from(px[0]), f32::from(px[1]), f32::from(px[2])];

        if retro_i > 0.0 {
            c = apply_retro(c, p.retro, retro_i);
        }

        if temp != 0.0 {
            c[0] *= 1.0 + temp;
            c[2] *= 1.0 - temp;
        }
        if tint != 0.0 {
            c[1] *= 1.0 - tint;
            c[0] *= 1.0 + tint * 0.5;
            c[2] *= 1.0 + tint * 0.5;
        }

        if sat != 1.0 {
            let gray = luma(c[0], c[1], c[2]);
            for ch in &mut c {
                *ch = gray + (*ch - gray) * sat;
            }
        }

        if bright != 0.0 {
            for ch in &mut c {
                *ch += bright;
            }
        }

        if contrast != 1.0 {
            for ch in &mut c {
                *ch = (*ch - 128.0) * contrast + 128.0;
            }
        }

        if grain_amp > 0.0 {
            let n = rng.next_signed_unit() * grain_amp;
            for ch in &mut c {
                *ch += n;
            }
        }

        px[0] = clamp_u8(c[0]);
        px[1] = clamp_u8(c[1]);
        px[2] = clamp_u8(c[2]);
    }

    if p.blur > 0.0 {
        out = blur_straight(&out, p.blur)?;
    }
    Ok(out)
}

fn apply_retro(c: [f32; 3], style: RetroStyle, i: f32) -> [f32; 3] {
    match style {
        RetroStyle::None => c,
        RetroStyle::Bw => {
            let k = 1.0 + 0.5 * i;
            let v = (luma(c[0], c[1], c[2]) - 128.0) * k + 128.0;
            [v, v, v]
        }
        RetroStyle::Sepia => {
            let mut out = [0.0f32; 3];
            for (row, o) in SEPIA.iter().zip(out.iter_mut()) {
                let s = row[0] * c[0] + row[1] * c[1] + row[2] * c[2];
                *o = s.min(255.0);
            }
            [
                lerp(c[0], out[0], i),
                lerp(c[1], out[1], i),
                lerp(c[2], out[2], i),
            ]
        }
        RetroStyle::Postal => {
            let gray = luma(c[0], c[1], c[2]);
            let d = 0.6 * i;
            let (r, g, b) = (lerp(c[0], gray, d), lerp(c[1], gray, d), lerp(c[2], gray, d));
            [
                r * (1.0 + 0.08 * i) + 12.0 * i,
                g * (1.0 + 0.02 * i) + 6.0 * i,
                b * (1.0 - 0.12 * i),
            ]
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
#[path = "../../tests/unit/adjust/pipeline.rs"]
mod tests;
