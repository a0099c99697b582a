//! ffloop turns a single video file into an endless raw RGBA frame stream through `ffmpeg`.
//!
//! The interesting part is planning, which is pure and does no I/O:
//!
//! - validate [`LoopOptions`] and resolve where to seek (looping wraps the start offset into the
//!   source duration, padding keeps the seek at least one second before the end),
//! - assemble a linear filter chain (`concat` → `setpts` or `tpad`, then an optional `crop`)
//!   with pad labels threaded between stages,
//! - fix the raw output format.
//!
//! The resulting [`LoopPlan`] is rendered to an `ffmpeg` command line and run with [`spawn`],
//! which yields frames through a [`FrameStream`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Handing plans to the `ffmpeg` process.
pub mod engine;
/// Caller-facing options.
pub mod options;
/// Seek/loop policy and filter graph assembly.
pub mod plan;

pub use crate::foundation::core::{Fps, FrameSize};
pub use crate::foundation::error::{LoopError, LoopResult};
pub use crate::foundation::math::format_secs;

pub use crate::engine::args::{command_args, command_line};
pub use crate::engine::ffmpeg::{FfmpegConfig, FrameStream, spawn};
pub use crate::options::LoopOptions;
pub use crate::plan::crop::{CropOffset, CropRect};
pub use crate::plan::filter::{FilterArg, FilterChain, FilterGraph, FilterParams, FilterStage};
pub use crate::plan::seek::{InputSpec, LoopRequest, ResolvedSeekPlan};
pub use crate::plan::{LoopPlan, OutputSpec};
