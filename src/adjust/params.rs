use crate::foundation::math::Fnv1a64;

/// Retro look applied before the grading stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetroStyle {
    #[default]
    None,
    Bw,
    Sepia,
    Postal,
}

impl RetroStyle {
    fn tag(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Bw => 1,
            Self::Sepia => 2,
            Self::Postal => 3,
        }
    }
}

/// Inclusive `[min, max]` range of an adjustment slider.
pub type ParamRange = (f32, f32);

pub const TEMPERATURE_RANGE: ParamRange = (-25.0, 25.0);
pub const TINT_RANGE: ParamRange = (-25.0, 25.0);
pub const BRIGHTNESS_RANGE: ParamRange = (-30.0, 30.0);
pub const SATURATION_RANGE: ParamRange = (-30.0, 30.0);
pub const CONTRAST_RANGE: ParamRange = (-30.0, 30.0);
pub const BLUR_RANGE: ParamRange = (0.0, 30.0);
pub const RETRO_INTENSITY_RANGE: ParamRange = (0.0, 100.0);
pub const GRAIN_RANGE: ParamRange = (0.0, 100.0);

/// Per-image-layer adjustment parameters.
///
/// Percent-valued sliders (temperature, tint, brightness, saturation, contrast) are signed
/// percentages; `blur` is in pixels; retro intensity and grain are `0..=100`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AdjustParams {
    pub temperature: f32,
    pub tint: f32,
    pub brightness: f32,
    pub saturation: f32,
    pub contrast: f32,
    pub blur: f32,
    pub retro: RetroStyle,
    pub retro_intensity: f32,
    pub retro_grain: f32,
}

impl Default for AdjustParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            tint: 0.0,
            brightness: 0.0,
            saturation: 0.0,
            contrast: 0.0,
            blur: 0.0,
            retro: RetroStyle::None,
            retro_intensity: 60.0,
            retro_grain: 0.0,
        }
    }
}

fn clamp_to(v: f32, (lo, hi): ParamRange) -> f32 {
    if v.is_finite() { v.clamp(lo, hi) } else { 0.0 }
}

impl AdjustParams {
    /// Copy with every field clamped to its range; non-finite values become `0`.
    pub fn clamped(self) -> Self {
        Self {
            temperature: clamp_to(self.temperature, TEMPERATURE_RANGE),
            tint: clamp_to(self.tint, TINT_RANGE),
            brightness: clamp_to(self.brightness, BRIGHTNESS_RANGE),
            saturation: clamp_to(self.saturation, SATURATION_RANGE),
            contrast: clamp_to(self.contrast, CONTRAST_RANGE),
            blur: clamp_to(self.blur, BLUR_RANGE),
            retro: self.retro,
            retro_intensity: clamp_to(self.retro_intensity, RETRO_INTENSITY_RANGE),
            retro_grain: clamp_to(self.retro_grain, GRAIN_RANGE),
        }
    }

    /// `true` when applying these parameters would leave every pixel unchanged.
    pub fn is_neutral(&self) -> bool {
        let p = self.clamped();
        p.temperature == 0.0
            && p.tint == 0.0
            && p.brightness == 0.0
            && p.saturation == 0.0
            && p.contrast == 0.0
            && p.blur == 0.0
            && p.retro_grain == 0.0
            && (p.retro == RetroStyle::None || p.retro_intensity == 0.0)
    }

    /// Structural key of the clamped parameters.
    pub fn fingerprint(&self) -> u64 {
        let p = self.clamped();
        let mut h = Fnv1a64::new_default();
        for v in [
            p.temperature,
            p.tint,
            p.brightness,
            p.saturation,
            p.contrast,
            p.blur,
            p.retro_intensity,
            p.retro_grain,
        ] {
            h.write_f32(v);
        }
        h.write_u8(p.retro.tag());
        h.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/adjust/params.rs"]
mod tests;
