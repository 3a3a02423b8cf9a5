use image::RgbaImage;

use crate::foundation::error::LaminaResult;

/// Output quality: trades frame resolution and encoder effort for size and speed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Draft,
    #[default]
    Standard,
    High,
}

impl QualityPreset {
    /// Output scale relative to the canvas.
    pub fn scale(self) -> f64 {
        match self {
            Self::Draft => 0.5,
            Self::Standard => 0.75,
            Self::High => 1.0,
        }
    }

    /// Encoder speed, `1` (best) to `30` (fastest).
    pub fn encoder_speed(self) -> i32 {
        match self {
            Self::Draft => 30,
            Self::Standard => 10,
            Self::High => 1,
        }
    }
}

/// Configuration handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    pub quality: QualityPreset,
    /// `0` loops forever.
    pub loop_count: u16,
}

/// Encoder boundary: consumes `(frame, delay)` pairs in playback order and produces a byte blob.
///
/// A sink that gives up returns [`LaminaError::EncodeAborted`](crate::LaminaError::EncodeAborted)
/// from `push_frame` or `finish`; synthesis then fails with that error.
pub trait FrameSink {
    /// Called once before any frame is pushed.
    fn begin(&mut self, cfg: SinkConfig) -> LaminaResult<()>;
    /// Push one straight-alpha frame shown for `delay_ms`.
    fn push_frame(&mut self, frame: &RgbaImage, delay_ms: u32) -> LaminaResult<()>;
    /// Called once after the last frame; reports encode progress in `[0, 1]`.
    fn finish(&mut self, progress: &mut dyn FnMut(f32)) -> LaminaResult<Vec<u8>>;
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(RgbaImage, u32)>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    pub fn frames(&self) -> &[(RgbaImage, u32)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> LaminaResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, frame: &RgbaImage, delay_ms: u32) -> LaminaResult<()> {
        self.frames.push((frame.clone(), delay_ms));
        Ok(())
    }

    fn finish(&mut self, progress: &mut dyn FnMut(f32)) -> LaminaResult<Vec<u8>> {
        progress(1.0);
        Ok(Vec::new())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
