//! Seek/loop policy: how many inputs to open, where to seek each one, and whether the output
//! needs a short start trim.
//!
//! `ffmpeg` does not seek reliably on an input that is also stream-looped, and it can crash when
//! asked to seek to (or past) the end of a file. The policy works around both:
//!
//! - looping: one seeked, non-looped input followed by the same file looped forever from zero,
//!   joined downstream by a `concat` stage;
//! - not looping: a single input seeked to at least one second before the end, with any
//!   remaining distance (at most one second) trimmed on the output side.

use std::path::{Path, PathBuf};

/// Seek/loop request derived from validated options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopRequest {
    /// Requested start offset in seconds (`>= 0`).
    pub start: f64,
    /// Source duration in seconds, `None` when unknown.
    pub input_duration: Option<f64>,
    /// Loop the source (`true`) or pad its last frame (`false`).
    pub looping: bool,
}

impl LoopRequest {
    /// Build a request. Non-positive durations (such as `-1`) are treated as unknown.
    pub fn new(start: f64, input_duration: Option<f64>, looping: bool) -> Self {
        Self {
            start,
            input_duration: input_duration.filter(|d| d.is_finite() && *d > 0.0),
            looping,
        }
    }
}

/// One `ffmpeg` input.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct InputSpec {
    /// Source path or URL.
    pub path: PathBuf,
    /// Input-side seek (`-ss`) in seconds; `None` reads from the start.
    pub seek_offset: Option<f64>,
    /// Repeat the input forever (`-stream_loop -1`).
    pub stream_loop: bool,
}

/// Output of [`resolve`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ResolvedSeekPlan {
    /// Inputs in the order they are passed to `ffmpeg`.
    pub inputs: Vec<InputSpec>,
    /// Output-side seek (`-ss` after the inputs), only set when the input seek was clamped.
    pub output_start_trim: Option<f64>,
}

impl ResolvedSeekPlan {
    /// `true` when the plan streams the source in a loop.
    pub fn is_looping(&self) -> bool {
        self.inputs.iter().any(|input| input.stream_loop)
    }
}

/// Resolve the inputs and seek offsets for `path`.
pub fn resolve(path: &Path, req: &LoopRequest) -> ResolvedSeekPlan {
    if req.looping {
        resolve_looping(path, req)
    } else {
        resolve_padded(path, req)
    }
}

fn resolve_looping(path: &Path, req: &LoopRequest) -> ResolvedSeekPlan {
    let seek = match req.input_duration {
        Some(duration) => req.start.rem_euclid(duration),
        None => req.start,
    };

    ResolvedSeekPlan {
        inputs: vec![
            InputSpec {
                path: path.to_path_buf(),
                seek_offset: Some(seek),
                stream_loop: false,
            },
            InputSpec {
                path: path.to_path_buf(),
                seek_offset: None,
                stream_loop: true,
            },
        ],
        output_start_trim: None,
    }
}

fn resolve_padded(path: &Path, req: &LoopRequest) -> ResolvedSeekPlan {
    let start_before_end = start_before_end(req);
    let output_start_trim =
        (start_before_end < req.start).then(|| (req.start - start_before_end).min(1.0));

    ResolvedSeekPlan {
        inputs: vec![InputSpec {
            path: path.to_path_buf(),
            seek_offset: Some(start_before_end),
            stream_loop: false,
        }],
        output_start_trim,
    }
}

/// Input seek for the non-looping case: `start` clamped to `[0, duration - 1]` when the
/// duration is known.
pub fn start_before_end(req: &LoopRequest) -> f64 {
    match req.input_duration {
        // Not `f64::clamp`: for sources shorter than a second the upper bound is negative.
        Some(duration) => req.start.min(duration - 1.0).max(0.0),
        None => req.start,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/seek.rs"]
mod tests;
