use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{LaminaError, LaminaResult};

/// Animated GIF encoder.
///
/// Frames are buffered as pushed and quantized in `finish`, where encode progress is reported
/// per frame.
#[derive(Debug, Default)]
pub struct GifSink {
    cfg: Option<SinkConfig>,
    frames: Vec<(RgbaImage, u32)>,
}

impl GifSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> LaminaResult<()> {
        if cfg.width == 0 || cfg.height == 0 || cfg.width > 0xFFFF || cfg.height > 0xFFFF {
            return Err(LaminaError::encode_aborted(format!(
                "gif frame size {}x{} out of range",
                cfg.width, cfg.height
            )));
        }
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, frame: &RgbaImage, delay_ms: u32) -> LaminaResult<()> {
        let Some(cfg) = self.cfg else {
            return Err(LaminaError::encode_aborted("push_frame before begin"));
        };
        if frame.dimensions() != (cfg.width, cfg.height) {
            return Err(LaminaError::encode_aborted(format!(
                "frame is {}x{}, sink expects {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }
        self.frames.push((frame.clone(), delay_ms));
        Ok(())
    }

    fn finish(&mut self, progress: &mut dyn FnMut(f32)) -> LaminaResult<Vec<u8>> {
        let Some(cfg) = self.cfg.take() else {
            return Err(LaminaError::encode_aborted("finish before begin"));
        };
        let frames = std::mem::take(&mut self.frames);
        if frames.is_empty() {
            return Err(LaminaError::encode_aborted("no frames to encode"));
        }

        let mut out = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut out, cfg.quality.encoder_speed());
            let repeat = match cfg.loop_count {
                0 => Repeat::Infinite,
                n => Repeat::Finite(n),
            };
            encoder
                .set_repeat(repeat)
                .map_err(|e| LaminaError::encode_aborted(format!("gif header: {e}")))?;

            let total = frames.len();
            for (i, (img, delay_ms)) in frames.into_iter().enumerate() {
                let frame = Frame::from_parts(img, 0, 0, Delay::from_numer_denom_ms(delay_ms, 1));
                encoder
                    .encode_frame(frame)
                    .map_err(|e| LaminaError::encode_aborted(format!("gif frame {i}: {e}")))?;
                progress((i + 1) as f32 / total as f32);
            }
        }
        tracing::debug!(bytes = out.len(), "gif encoded");
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
