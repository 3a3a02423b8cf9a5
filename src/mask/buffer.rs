use image::RgbaImage;

use crate::foundation::error::{LaminaError, LaminaResult};
use crate::foundation::math::mul_div255_u8;

/// Single-channel alpha buffer matching a layer's working raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl AlphaMask {
    /// Fully opaque mask; every new mask starts here.
    pub fn opaque(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![255; width as usize * height as usize],
        }
    }

    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> LaminaResult<Self> {
        if data.len() != width as usize * height as usize {
            return Err(LaminaError::validation(
                "mask data length must equal width*height",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }

    pub fn is_fully_opaque(&self) -> bool {
        self.data.iter().all(|&a| a == 255)
    }

    /// Restrict this mask by `other`: each texel keeps the smaller alpha.
    pub fn intersect(&mut self, other: &AlphaMask) -> LaminaResult<()> {
        if self.dimensions() != other.dimensions() {
            return Err(LaminaError::validation(format!(
                "mask size mismatch: {:?} vs {:?}",
                self.dimensions(),
                other.dimensions()
            )));
        }
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a = (*a).min(b);
        }
        Ok(())
    }

    /// Multiply the raster's alpha channel by this mask.
    pub fn apply_to(&self, img: &RgbaImage) -> LaminaResult<RgbaImage> {
        if img.dimensions() != self.dimensions() {
            return Err(LaminaError::validation(
                "mask and raster dimensions differ",
            ));
        }
        let mut out = img.clone();
        for (px, &m) in out.pixels_mut().zip(&self.data) {
            px[3] = mul_div255_u8(u16::from(px[3]), u16::from(m));
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/buffer.rs"]
mod tests;
