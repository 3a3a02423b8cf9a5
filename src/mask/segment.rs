//! Ingestion of externally computed foreground alpha, plus the strength remap curve.

use image::{GrayImage, imageops::FilterType};

use crate::foundation::core::LayerId;
use crate::foundation::error::{LaminaError, LaminaResult};
use crate::foundation::math::clamp_u8;
use crate::mask::buffer::AlphaMask;

/// Default position of the "AI strength" slider.
pub const DEFAULT_SEGMENTATION_STRENGTH: f32 = 50.0;

/// Background-segmentation service boundary.
///
/// Input is one encoded raster (PNG); output is an encoded raster of the same dimensions whose
/// alpha channel carries the predicted foreground.
#[allow(async_fn_in_trait)]
pub trait Segmenter {
    async fn segment(&self, png: &[u8]) -> LaminaResult<Vec<u8>>;
}

/// One out-of-band segmentation run, tied to the layer state it was taken from.
///
/// Holds no borrow of the session, so the host keeps rendering while the service works.
#[derive(Clone, Debug)]
pub struct SegmentationRequest {
    pub layer: LayerId,
    /// PNG of the layer's working colors.
    pub png: Vec<u8>,
    pub(crate) revision: u64,
    pub(crate) size: (u32, u32),
}

impl SegmentationRequest {
    /// Send the request through `segmenter`; any failure comes back as a segmentation error.
    pub async fn run<S: Segmenter>(&self, segmenter: &S) -> LaminaResult<Vec<u8>> {
        match segmenter.segment(&self.png).await {
            Ok(bytes) => Ok(bytes),
            Err(e @ LaminaError::Segmentation(_)) => Err(e),
            Err(e) => Err(LaminaError::segmentation(e.to_string())),
        }
    }
}

/// Pull the alpha channel out of the segmenter's encoded output.
///
/// Output of a different size is resampled to `width x height`.
pub fn alpha_from_segmentation(bytes: &[u8], width: u32, height: u32) -> LaminaResult<GrayImage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| LaminaError::segmentation(format!("undecodable segmentation output: {e}")))?
        .to_rgba8();
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(LaminaError::segmentation("segmentation output is empty"));
    }

    let alpha = GrayImage::from_fn(decoded.width(), decoded.height(), |x, y| {
        image::Luma([decoded.get_pixel(x, y)[3]])
    });
    if alpha.dimensions() == (width, height) {
        return Ok(alpha);
    }
    tracing::debug!(
        from = ?alpha.dimensions(),
        to = ?(width, height),
        "resampling segmentation alpha"
    );
    Ok(image::imageops::resize(
        &alpha,
        width,
        height,
        FilterType::Triangle,
    ))
}

/// Remap curve derived from the 0..=100 strength slider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentationCurve {
    pub low: f32,
    pub high: f32,
    pub gamma: f32,
}

impl SegmentationCurve {
    /// Higher strength raises the low cutoff and the exponent (harder matte); lower strength
    /// relaxes both.
    pub fn from_strength(strength: f32) -> Self {
        let n = if strength.is_finite() {
            (strength / 100.0).clamp(0.0, 1.0)
        } else {
            DEFAULT_SEGMENTATION_STRENGTH / 100.0
        };
        Self {
            low: 0.04 + 0.36 * n,
            high: 0.75 + 0.20 * n,
            gamma: 0.6 + 1.4 * n,
        }
    }

    pub fn apply(&self, alpha: u8) -> u8 {
        let a = f32::from(alpha) / 255.0;
        let t = ((a - self.low) / (self.high - self.low)).clamp(0.0, 1.0);
        clamp_u8(t.powf(self.gamma) * 255.0)
    }

    pub fn remap(&self, raw: &GrayImage) -> AlphaMask {
        let data = raw.as_raw().iter().map(|&a| self.apply(a)).collect();
        AlphaMask::from_raw(raw.width(), raw.height(), data)
            .unwrap_or_else(|_| AlphaMask::opaque(raw.width(), raw.height()))
    }
}

/// Live segmentation state kept on an image layer so strength changes re-run only the remap.
#[derive(Clone, Debug)]
pub struct SegmentationState {
    /// Alpha as returned by the segmenter, already at raster size.
    pub raw: GrayImage,
    /// Mask as it was before segmentation was applied; the remap is intersected with it.
    pub base: AlphaMask,
    pub strength: f32,
}

impl SegmentationState {
    pub fn new(raw: GrayImage, base: AlphaMask, strength: f32) -> Self {
        Self {
            raw,
            base,
            strength,
        }
    }

    /// Current mask: the prior mask restricted by the remapped segmentation alpha.
    pub fn resolve(&self) -> LaminaResult<AlphaMask> {
        let mut mask = self.base.clone();
        mask.intersect(&SegmentationCurve::from_strength(self.strength).remap(&self.raw))?;
        Ok(mask)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/segment.rs"]
mod tests;
