//! Pure planning: options in, immutable [`LoopPlan`] out. Nothing here spawns a process.

/// Crop window parsing.
pub mod crop;
/// Filter chain assembly and rendering.
pub mod filter;
/// Seek/loop policy.
pub mod seek;

use std::path::{Path, PathBuf};

use crate::foundation::core::{Fps, FrameSize};
use crate::foundation::error::{LoopError, LoopResult};
use crate::options::LoopOptions;
use crate::plan::crop::CropRect;
use crate::plan::filter::{FilterGraph, assemble};
use crate::plan::seek::{ResolvedSeekPlan, resolve};

/// Fixed raw output: no audio, RGBA8 `rawvideo` at an explicit size and rate.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct OutputSpec {
    /// Output frame size.
    pub size: FrameSize,
    /// Output frame rate.
    pub fps: Fps,
}

impl OutputSpec {
    /// Container and codec name.
    pub const FORMAT: &'static str = "rawvideo";
    /// Pixel format (4 bytes per pixel).
    pub const PIXEL_FORMAT: &'static str = "rgba";

    /// Bytes in one output frame.
    pub fn frame_len(&self) -> usize {
        self.size.frame_len()
    }
}

/// Everything `ffmpeg` needs to produce the stream, assembled once and never mutated.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LoopPlan {
    source: PathBuf,
    seek: ResolvedSeekPlan,
    filters: FilterGraph,
    crop: Option<CropRect>,
    output: OutputSpec,
}

impl LoopPlan {
    /// Validate `opts` and build the plan for `source`.
    ///
    /// Fails only on precondition violations (missing or malformed `fps`/`width`/`height`,
    /// negative `start`, `start > 0` without `inputDuration`). Malformed crop values disable
    /// cropping instead of failing.
    #[tracing::instrument(skip_all, fields(source = %source.as_ref().display()))]
    pub fn build(source: impl AsRef<Path>, opts: &LoopOptions) -> LoopResult<Self> {
        let source = source.as_ref();
        let valid = opts.validate()?;

        let seek = resolve(source, &valid.request);
        let crop =
            CropRect::from_options(opts.crop_width, opts.crop_height, opts.crop_x, opts.crop_y);
        let filters = assemble(&seek, crop.as_ref());

        tracing::debug!(
            inputs = seek.inputs.len(),
            stages = filters.len(),
            looping = seek.is_looping(),
            cropped = filters.has_crop,
            "built loop plan"
        );

        Ok(Self {
            source: source.to_path_buf(),
            seek,
            filters,
            crop,
            output: OutputSpec {
                size: valid.size,
                fps: valid.fps,
            },
        })
    }

    /// Source path.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Resolved inputs and output trim.
    pub fn seek(&self) -> &ResolvedSeekPlan {
        &self.seek
    }

    /// Assembled filter chain.
    pub fn filters(&self) -> &FilterGraph {
        &self.filters
    }

    /// Crop window, when cropping is enabled.
    pub fn crop(&self) -> Option<&CropRect> {
        self.crop.as_ref()
    }

    /// Output format.
    pub fn output(&self) -> &OutputSpec {
        &self.output
    }

    /// Pretty JSON rendering for inspection.
    pub fn to_json_pretty(&self) -> LoopResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LoopError::serde(format!("serialize loop plan: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/plan.rs"]
mod tests;
