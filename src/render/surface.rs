use image::RgbaImage;

use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{LaminaError, LaminaResult};
use crate::raster::composite::{RectPlacement, over_rect_in_place};
use crate::raster::decode::unpremultiply_rgba8_in_place;

/// Host drawing surface: a premultiplied RGBA8 pixmap the compositor renders into.
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

impl Surface {
    pub fn new(canvas: Canvas) -> LaminaResult<Self> {
        let (w, h) = surface_dims(canvas)?;
        Ok(Self {
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Reallocate for a new canvas size; contents are cleared.
    pub fn resize(&mut self, canvas: Canvas) -> LaminaResult<()> {
        if canvas != self.canvas() {
            *self = Self::new(canvas)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.pixmap.data_as_u8_slice_mut().fill(0);
    }

    pub fn fill(&mut self, color: Rgba8) {
        let px = color.to_premul();
        for d in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    pub fn snapshot(&self) -> Vec<u8> {
        self.data().to_vec()
    }

    pub fn restore(&mut self, bytes: &[u8]) -> LaminaResult<()> {
        let data = self.data_mut();
        if data.len() != bytes.len() {
            return Err(LaminaError::render("snapshot size does not match surface"));
        }
        data.copy_from_slice(bytes);
        Ok(())
    }

    /// Source-over a premultiplied `pixmap` with its top-left at `(x, y)`.
    pub(crate) fn draw_pixmap(
        &mut self,
        pixmap: &vello_cpu::Pixmap,
        x: i32,
        y: i32,
        opacity: f32,
    ) -> LaminaResult<()> {
        let place = RectPlacement {
            dst_width: self.width(),
            dst_height: self.height(),
            src_width: u32::from(pixmap.width()),
            src_height: u32::from(pixmap.height()),
            x,
            y,
        };
        over_rect_in_place(
            self.pixmap.data_as_u8_slice_mut(),
            pixmap.data_as_u8_slice(),
            place,
            opacity,
        )
    }

    /// Straight-alpha pixel, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = (y as usize * self.width() as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data()[i..i + 4]);
        unpremultiply_rgba8_in_place(&mut px);
        Some(Rgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
    }

    /// Straight-alpha copy of the whole surface.
    pub fn to_rgba_image(&self) -> LaminaResult<RgbaImage> {
        let mut bytes = self.snapshot();
        unpremultiply_rgba8_in_place(&mut bytes);
        RgbaImage::from_raw(self.width(), self.height(), bytes)
            .ok_or_else(|| LaminaError::render("surface bytes do not match dimensions"))
    }
}

pub(crate) fn surface_dims(canvas: Canvas) -> LaminaResult<(u16, u16)> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(LaminaError::render("surface must be at least 1x1"));
    }
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| LaminaError::render("surface width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| LaminaError::render("surface height exceeds u16"))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
