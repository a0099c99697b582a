//! Handing a [`crate::LoopPlan`] to the external `ffmpeg` process.

/// Plan to command-line rendering.
pub mod args;
/// Process spawning and frame streaming.
pub mod ffmpeg;
