//! Chroma-key scoring, mask building and de-spill.

use image::RgbaImage;

use crate::adjust::color::{Hsv, hue_distance, rgb_to_hsv};
use crate::foundation::core::Rgba8;
use crate::foundation::math::{clamp_u8, smoothstep};
use crate::mask::buffer::AlphaMask;

/// Hue of the default green-screen key, in degrees.
pub const DEFAULT_KEY_HUE: f32 = 120.0;
/// Fraction of the threshold where the attenuated band starts.
const MID_BAND_START: f32 = 0.55;
/// Alpha kept at the bottom of the attenuated band.
const MID_BAND_ALPHA: f32 = 0.2;

/// What the keyer scores pixels against.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyReference {
    /// A fixed key hue in degrees (green screen is 120).
    Hue(f32),
    /// A single pixel sampled with the eyedropper.
    Sample(Rgba8),
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChromaParams {
    pub reference: KeyReference,
    /// Hue half-width (degrees) of the hard gate for hue keys; `0..=1` looseness for samples.
    pub tolerance: f32,
    /// Extra hue width (degrees) over which the soft gradient fades out.
    pub softness: f32,
    /// Key strength at or above which pixels become fully transparent.
    pub threshold: f32,
    /// How strongly to neutralize key-colored spill, `0..=1`.
    pub despill: f32,
}

impl Default for ChromaParams {
    fn default() -> Self {
        Self {
            reference: KeyReference::Hue(DEFAULT_KEY_HUE),
            tolerance: 38.0,
            softness: 28.0,
            threshold: 0.5,
            despill: 1.0,
        }
    }
}

impl ChromaParams {
    /// Eyedropper defaults around a sampled color.
    pub fn sampled(color: Rgba8) -> Self {
        Self {
            reference: KeyReference::Sample(color),
            tolerance: 0.5,
            ..Self::default()
        }
    }
}

/// Precomputed keyer for one set of parameters.
#[derive(Clone, Debug)]
pub struct ChromaKeyer {
    params: ChromaParams,
    sample: Option<(Rgba8, Hsv)>,
    dominant: Option<usize>,
}

impl ChromaKeyer {
    pub fn new(params: ChromaParams) -> Self {
        let (sample, dominant) = match params.reference {
            KeyReference::Hue(h) => (None, Some(dominant_channel_for_hue(h))),
            KeyReference::Sample(c) => {
                let hsv = rgb_to_hsv(c.r, c.g, c.b);
                let dominant = (hsv.s > 0.2).then(|| argmax([c.r, c.g, c.b]));
                (Some((c, hsv)), dominant)
            }
        };
        Self {
            params,
            sample,
            dominant,
        }
    }

    pub fn params(&self) -> &ChromaParams {
        &self.params
    }

    /// Key strength in `[0, 1]`; `1` means "this is the key color".
    pub fn strength(&self, r: u8, g: u8, b: u8) -> f32 {
        match (self.params.reference, self.sample) {
            (_, Some((key, key_hsv))) => self.sampled_strength(r, g, b, key, key_hsv),
            (KeyReference::Hue(h), None) => self.hue_strength(r, g, b, h),
            (KeyReference::Sample(_), None) => self.hue_strength(r, g, b, DEFAULT_KEY_HUE),
        }
    }

    fn hue_strength(&self, r: u8, g: u8, b: u8, key_hue: f32) -> f32 {
        let hsv = rgb_to_hsv(r, g, b);
        let d = hue_distance(hsv.h, key_hue);
        let tolerance = self.params.tolerance.max(0.0);
        let reach = tolerance + self.params.softness.max(1.0);

        let soft = 1.0 - smoothstep(0.0, reach, d);
        let gate = if d <= tolerance { 1.0 } else { 0.0 };
        let chroma = smoothstep(0.10, 0.35, hsv.s) * smoothstep(0.08, 0.25, hsv.v);
        ((0.5 * soft + 0.5 * gate) * chroma).clamp(0.0, 1.0)
    }

    fn sampled_strength(&self, r: u8, g: u8, b: u8, key: Rgba8, key_hsv: Hsv) -> f32 {
        let dr = f32::from(r) - f32::from(key.r);
        let dg = f32::from(g) - f32::from(key.g);
        let db = f32::from(b) - f32::from(key.b);
        let rgb_dist = (dr * dr + dg * dg + db * db).sqrt() / (255.0 * 3f32.sqrt());

        let hsv = rgb_to_hsv(r, g, b);
        let hue_weight = key_hsv.s.min(hsv.s);
        let dh = hue_distance(hsv.h, key_hsv.h) / 180.0 * hue_weight;
        let ds = (hsv.s - key_hsv.s).abs();
        let dv = (hsv.v - key_hsv.v).abs();
        let hsv_dist = (0.5 * dh + 0.3 * ds + 0.2 * dv).clamp(0.0, 1.0);

        let blend = 0.5 * rgb_dist + 0.5 * hsv_dist;
        let tol = self.params.tolerance.clamp(0.0, 1.0);
        let floor = 0.04 + 0.12 * tol + 0.06 * key_hsv.s;
        let spread = 0.08 + 0.10 * tol;
        1.0 - smoothstep(floor, floor + spread, blend)
    }

    /// Alpha for a given key strength: cut, attenuated band, or kept.
    pub fn alpha_for_strength(&self, strength: f32) -> u8 {
        let hi = self.params.threshold.clamp(0.01, 1.0);
        let lo = hi * MID_BAND_START;
        if strength >= hi {
            0
        } else if strength >= lo {
            let t = (strength - lo) / (hi - lo);
            clamp_u8(255.0 * MID_BAND_ALPHA * (1.0 - t))
        } else {
            255
        }
    }

    /// Score every pixel; returns the mask and the per-pixel strengths for de-spill.
    pub fn build_mask(&self, img: &RgbaImage) -> (AlphaMask, Vec<f32>) {
        let (w, h) = img.dimensions();
        let mut strengths = Vec::with_capacity(w as usize * h as usize);
        let mut alpha = Vec::with_capacity(w as usize * h as usize);
        for px in img.pixels() {
            let s = self.strength(px[0], px[1], px[2]);
            strengths.push(s);
            alpha.push(self.alpha_for_strength(s));
        }
        let mask = AlphaMask::from_raw(w, h, alpha).unwrap_or_else(|_| AlphaMask::opaque(w, h));
        (mask, strengths)
    }

    /// Pull the key's dominant channel toward the max of the other two, by key strength.
    pub fn despill_in_place(&self, img: &mut RgbaImage, strengths: &[f32]) {
        let Some(dom) = self.dominant else {
            return;
        };
        let amount = self.params.despill.clamp(0.0, 1.0);
        if amount <= 0.0 {
            return;
        }
        for (px, &s) in img.pixels_mut().zip(strengths) {
            if s <= 0.0 || px[3] == 0 {
                continue;
            }
            let (o1, o2) = match dom {
                0 => (1, 2),
                1 => (0, 2),
                _ => (0, 1),
            };
            let limit = px[o1].max(px[o2]);
            if px[dom] > limit {
                let excess = f32::from(px[dom] - limit);
                px[dom] = clamp_u8(f32::from(px[dom]) - excess * s * amount);
            }
        }
    }
}

fn dominant_channel_for_hue(hue: f32) -> usize {
    ((hue.rem_euclid(360.0) / 120.0).round() as usize) % 3
}

fn argmax(c: [u8; 3]) -> usize {
    let mut best = 0;
    for i in 1..3 {
        if c[i] > c[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
#[path = "../../tests/unit/mask/chroma.rs"]
mod tests;
