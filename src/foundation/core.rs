use crate::foundation::error::{LoopError, LoopResult};
use crate::foundation::math::format_secs;

/// Output frame rate in frames per second.
///
/// Fractional rates such as `29.97` are allowed; the value is always finite and positive.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize)]
pub struct Fps(f64);

impl Fps {
    /// Create a validated frame rate.
    pub fn new(fps: f64) -> LoopResult<Self> {
        if !fps.is_finite() {
            return Err(LoopError::validation("fps must be a finite number"));
        }
        if fps <= 0.0 {
            return Err(LoopError::validation("fps must be > 0"));
        }
        Ok(Self(fps))
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        1.0 / self.0
    }
}

impl std::fmt::Display for Fps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_secs(self.0))
    }
}

/// Raw output frame dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Bytes per RGBA8 pixel.
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Create a validated, non-empty frame size.
    pub fn new(width: u32, height: u32) -> LoopResult<Self> {
        if width == 0 || height == 0 {
            return Err(LoopError::validation("frame width/height must be non-zero"));
        }
        Ok(Self { width, height })
    }

    /// Number of bytes in one RGBA8 frame.
    pub fn frame_len(self) -> usize {
        self.width as usize * self.height as usize * Self::BYTES_PER_PIXEL
    }
}

impl std::fmt::Display for FrameSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
