use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::foundation::core::{Fps, FrameSize};
use crate::foundation::error::{LoopError, LoopResult};
use crate::foundation::math::as_whole;
use crate::plan::seek::LoopRequest;

/// Caller-facing options for building a [`crate::LoopPlan`].
///
/// Field names follow the camelCase keys accepted in JSON option files (`fps`, `width`,
/// `height`, `loop`, `start`, `inputDuration`, `cropWidth`, `cropHeight`, `cropX`, `cropY`).
///
/// Numeric fields are parsed leniently: numbers and numeric strings are accepted, any other
/// JSON value is kept as `NaN` so validation can report it (required fields) or ignore it
/// (crop fields). All crop dimensions are in source-video pixels, not output pixels.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoopOptions {
    /// Output frame rate.
    #[serde(deserialize_with = "lenient_number")]
    pub fps: Option<f64>,
    /// Output width in pixels.
    #[serde(deserialize_with = "lenient_number")]
    pub width: Option<f64>,
    /// Output height in pixels.
    #[serde(deserialize_with = "lenient_number")]
    pub height: Option<f64>,
    /// Loop the source forever (`true`, the default) or pad its last frame forever.
    #[serde(rename = "loop")]
    pub looping: Option<bool>,
    /// Seek to this time (seconds) before producing frames.
    #[serde(deserialize_with = "lenient_number")]
    pub start: Option<f64>,
    /// Source duration in seconds. Required when `start > 0`; non-positive means unknown.
    #[serde(deserialize_with = "lenient_number")]
    pub input_duration: Option<f64>,
    /// Crop width. Cropping needs both width and height.
    #[serde(deserialize_with = "lenient_number")]
    pub crop_width: Option<f64>,
    /// Crop height.
    #[serde(deserialize_with = "lenient_number")]
    pub crop_height: Option<f64>,
    /// Crop x offset. Without both x and y the crop is centred.
    #[serde(deserialize_with = "lenient_number")]
    pub crop_x: Option<f64>,
    /// Crop y offset.
    #[serde(deserialize_with = "lenient_number")]
    pub crop_y: Option<f64>,
}

/// Options after precondition checks, ready for planning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ValidatedOptions {
    pub fps: Fps,
    pub size: FrameSize,
    pub request: LoopRequest,
}

impl LoopOptions {
    /// Options with the three required values set and everything else defaulted.
    pub fn new(fps: f64, width: u32, height: u32) -> Self {
        Self {
            fps: Some(fps),
            width: Some(f64::from(width)),
            height: Some(f64::from(height)),
            ..Self::default()
        }
    }

    /// Choose between looping the source and padding its last frame.
    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = Some(looping);
        self
    }

    /// Set the requested start offset in seconds.
    pub fn with_start(mut self, start: f64) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the known source duration in seconds.
    pub fn with_input_duration(mut self, duration: f64) -> Self {
        self.input_duration = Some(duration);
        self
    }

    /// Crop the source to `width x height` (centred unless an offset is set).
    pub fn with_crop(mut self, width: u32, height: u32) -> Self {
        self.crop_width = Some(f64::from(width));
        self.crop_height = Some(f64::from(height));
        self
    }

    /// Place the crop window at `(x, y)`.
    pub fn with_crop_offset(mut self, x: u32, y: u32) -> Self {
        self.crop_x = Some(f64::from(x));
        self.crop_y = Some(f64::from(y));
        self
    }

    /// Parse options from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> LoopResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| LoopError::serde(format!("parse loop options JSON: {e}")))
    }

    /// Parse options from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> LoopResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LoopError::validation(format!("open loop options JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Overlay every option set in `other` on top of `self`.
    pub fn merged(mut self, other: &LoopOptions) -> Self {
        fn pick<T: Copy>(dst: &mut Option<T>, src: Option<T>) {
            if src.is_some() {
                *dst = src;
            }
        }
        pick(&mut self.fps, other.fps);
        pick(&mut self.width, other.width);
        pick(&mut self.height, other.height);
        pick(&mut self.looping, other.looping);
        pick(&mut self.start, other.start);
        pick(&mut self.input_duration, other.input_duration);
        pick(&mut self.crop_width, other.crop_width);
        pick(&mut self.crop_height, other.crop_height);
        pick(&mut self.crop_x, other.crop_x);
        pick(&mut self.crop_y, other.crop_y);
        self
    }

    /// Check the preconditions that must hold before a plan is built.
    pub(crate) fn validate(&self) -> LoopResult<ValidatedOptions> {
        let fps = Fps::new(required_number("fps", self.fps)?)?;
        let width = required_dimension("width", self.width)?;
        let height = required_dimension("height", self.height)?;
        let size = FrameSize::new(width, height)?;

        let start = match self.start {
            None => 0.0,
            Some(v) if !v.is_finite() => {
                return Err(LoopError::validation("start must be a finite number"));
            }
            Some(v) if v < 0.0 => return Err(LoopError::validation("start must be >= 0")),
            Some(v) => v,
        };

        let input_duration = match self.input_duration {
            Some(v) if v.is_nan() => {
                return Err(LoopError::validation("inputDuration must be a number"));
            }
            other => other,
        };
        if start > 0.0 && input_duration.is_none() {
            return Err(LoopError::validation(
                "inputDuration is required when start > 0 (needed to keep the seek before the end of the input)",
            ));
        }

        Ok(ValidatedOptions {
            fps,
            size,
            request: LoopRequest::new(start, input_duration, self.looping.unwrap_or(true)),
        })
    }
}

fn required_number(name: &str, v: Option<f64>) -> LoopResult<f64> {
    match v {
        None => Err(LoopError::validation(format!("{name} is required"))),
        Some(v) if v.is_nan() => Err(LoopError::validation(format!("{name} must be a number"))),
        Some(v) => Ok(v),
    }
}

fn required_dimension(name: &str, v: Option<f64>) -> LoopResult<u32> {
    let v = required_number(name, v)?;
    let whole = as_whole(v)
        .ok_or_else(|| LoopError::validation(format!("{name} must be an integer, got {v}")))?;
    if whole <= 0.0 || whole > f64::from(u32::MAX) {
        return Err(LoopError::validation(format!(
            "{name} must be a positive integer, got {whole}"
        )));
    }
    Ok(whole as u32)
}

/// Accept JSON numbers and numeric strings; keep any other non-null value as `NaN`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    Ok(match v {
        serde_json::Value::Null => None,
        serde_json::Value::Number(n) => Some(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Some(s.trim().parse::<f64>().unwrap_or(f64::NAN)),
        _ => Some(f64::NAN),
    })
}

#[cfg(test)]
#[path = "../tests/unit/options.rs"]
mod tests;
