use crate::foundation::error::{LaminaError, LaminaResult};
use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

/// Source-over for one premultiplied pixel with a global opacity.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> LaminaResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(LaminaError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Placement of a smaller premultiplied buffer on a larger one.
#[derive(Clone, Copy, Debug)]
pub struct RectPlacement {
    pub dst_width: u32,
    pub dst_height: u32,
    pub src_width: u32,
    pub src_height: u32,
    /// Top-left of `src` in `dst` pixels; may be negative or out of bounds.
    pub x: i32,
    pub y: i32,
}

/// Source-over `src` onto a sub-rectangle of `dst`, clipping to `dst` bounds.
pub fn over_rect_in_place(
    dst: &mut [u8],
    src: &[u8],
    place: RectPlacement,
    opacity: f32,
) -> LaminaResult<()> {
    let dst_len = place.dst_width as usize * place.dst_height as usize * 4;
    let src_len = place.src_width as usize * place.src_height as usize * 4;
    if dst.len() != dst_len || src.len() != src_len {
        return Err(LaminaError::render(
            "over_rect_in_place buffer sizes do not match placement",
        ));
    }

    let x0 = place.x.max(0);
    let y0 = place.y.max(0);
    let x1 = (place.x + place.src_width as i32).min(place.dst_width as i32);
    let y1 = (place.y + place.src_height as i32).min(place.dst_height as i32);
    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }

    for y in y0..y1 {
        let sy = (y - place.y) as usize;
        for x in x0..x1 {
            let sx = (x - place.x) as usize;
            let si = (sy * place.src_width as usize + sx) * 4;
            let di = (y as usize * place.dst_width as usize + x as usize) * 4;
            let s = [src[si], src[si + 1], src[si + 2], src[si + 3]];
            if s[3] == 0 {
                continue;
            }
            let d = [dst[di], dst[di + 1], dst[di + 2], dst[di + 3]];
            dst[di..di + 4].copy_from_slice(&over(d, s, opacity));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/raster/composite.rs"]
mod tests;
