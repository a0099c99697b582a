use crate::foundation::math::as_whole;

/// Crop window in source-video pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CropRect {
    /// Crop width.
    pub width: u32,
    /// Crop height.
    pub height: u32,
    /// Top-left corner; `None` lets `ffmpeg` centre the window.
    pub offset: Option<CropOffset>,
}

/// Top-left corner of a [`CropRect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CropOffset {
    /// Horizontal offset.
    pub x: u32,
    /// Vertical offset.
    pub y: u32,
}

impl CropRect {
    /// Centred crop of `width x height`.
    pub fn centered(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            offset: None,
        }
    }

    /// Crop of `width x height` with its top-left corner at `(x, y)`.
    pub fn at(width: u32, height: u32, x: u32, y: u32) -> Self {
        Self {
            width,
            height,
            offset: Some(CropOffset { x, y }),
        }
    }

    /// Build a crop from loosely typed option values.
    ///
    /// Cropping is opportunistic: returns `None` unless width and height are both positive
    /// whole numbers. The offset is kept only when x and y are both non-negative whole numbers.
    pub fn from_options(
        width: Option<f64>,
        height: Option<f64>,
        x: Option<f64>,
        y: Option<f64>,
    ) -> Option<Self> {
        let width = width.and_then(positive_px)?;
        let height = height.and_then(positive_px)?;
        let offset = match (x.and_then(offset_px), y.and_then(offset_px)) {
            (Some(x), Some(y)) => Some(CropOffset { x, y }),
            _ => None,
        };
        Some(Self {
            width,
            height,
            offset,
        })
    }

    /// Positional `crop` filter arguments: `w:h` or `w:h:x:y`.
    pub fn filter_args(&self) -> Vec<String> {
        let mut args = vec![self.width.to_string(), self.height.to_string()];
        if let Some(CropOffset { x, y }) = self.offset {
            args.push(x.to_string());
            args.push(y.to_string());
        }
        args
    }
}

fn offset_px(v: f64) -> Option<u32> {
    let v = as_whole(v)?;
    (0.0..=f64::from(u32::MAX)).contains(&v).then_some(v as u32)
}

fn positive_px(v: f64) -> Option<u32> {
    offset_px(v).filter(|&px| px > 0)
}

#[cfg(test)]
#[path = "../../tests/unit/plan/crop.rs"]
mod tests;
