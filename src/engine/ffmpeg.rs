use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::JoinHandle;

use crate::engine::args::{command_args, command_line};
use crate::foundation::error::{LoopError, LoopResult};
use crate::plan::LoopPlan;

/// Bytes of `ffmpeg` stderr kept for error reports.
const STDERR_TAIL_BYTES: usize = 16 * 1024;

/// How to invoke the `ffmpeg` binary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FfmpegConfig {
    /// Binary path, or a bare name looked up on `PATH`.
    pub binary: PathBuf,
    /// Value passed to `-loglevel`.
    pub log_level: String,
    /// Pass `-hide_banner`.
    pub hide_banner: bool,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            log_level: "error".to_string(),
            hide_banner: true,
        }
    }
}

impl FfmpegConfig {
    /// Use the `ffmpeg` binary at `binary`.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            ..Self::default()
        }
    }

    /// Return `true` when the configured binary runs `-version` successfully.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

/// Spawn `ffmpeg` for `plan` and return its stdout as a stream of RGBA frames.
///
/// The stream is endless unless the source cannot be read; stop it with [`FrameStream::kill`]
/// or by dropping it.
#[tracing::instrument(skip_all, fields(source = %plan.source().display()))]
pub fn spawn(cfg: &FfmpegConfig, plan: &LoopPlan) -> LoopResult<FrameStream> {
    tracing::debug!(command = %command_line(cfg, plan), "starting ffmpeg");

    let mut child = Command::new(&cfg.binary)
        .args(command_args(cfg, plan))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            LoopError::engine(format!(
                "failed to spawn '{}' (is it installed and on PATH?): {e}",
                cfg.binary.display()
            ))
        })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| LoopError::engine("failed to open ffmpeg stdout (unexpected)"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| LoopError::engine("failed to open ffmpeg stderr (unexpected)"))?;
    let stderr_drain = std::thread::spawn(move || {
        let mut tail = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stderr.read(&mut buf)?;
            if n == 0 {
                break;
            }
            tail.extend_from_slice(&buf[..n]);
            if tail.len() > STDERR_TAIL_BYTES {
                tail.drain(..tail.len() - STDERR_TAIL_BYTES);
            }
        }
        Ok::<_, std::io::Error>(tail)
    });

    tracing::info!(pid = child.id(), frame_len = plan.output().frame_len(), "ffmpeg started");

    Ok(FrameStream {
        child: Some(child),
        stdout: Some(stdout),
        stderr_drain: Some(stderr_drain),
        frame_len: plan.output().frame_len(),
        frames_read: 0,
    })
}

/// Raw RGBA frames read from a running `ffmpeg` process.
///
/// Reading applies backpressure: `ffmpeg` blocks once the pipe is full. Dropping the stream
/// kills the process.
pub struct FrameStream {
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    frame_len: usize,
    frames_read: u64,
}

impl FrameStream {
    /// Bytes per frame.
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Frames returned so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Process id of the running `ffmpeg`, if still running.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Read the next frame into `buf` (resized to [`FrameStream::frame_len`]).
    ///
    /// Returns `Ok(false)` once `ffmpeg` has closed its output and exited successfully.
    pub fn read_frame_into(&mut self, buf: &mut Vec<u8>) -> LoopResult<bool> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(false);
        };

        buf.resize(self.frame_len, 0);
        let mut filled = 0usize;
        while filled < self.frame_len {
            match stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.stdout = None;
                    return Err(LoopError::engine(format!(
                        "failed to read frame from ffmpeg stdout: {e}"
                    )));
                }
            }
        }

        if filled == self.frame_len {
            self.frames_read += 1;
            return Ok(true);
        }

        self.stdout = None;
        self.reap()?;
        if filled > 0 {
            return Err(LoopError::engine(format!(
                "ffmpeg output ended mid-frame after {} frames ({filled} of {} bytes)",
                self.frames_read, self.frame_len
            )));
        }
        Ok(false)
    }

    /// Read the next frame. `Ok(None)` means the stream has ended.
    pub fn next_frame(&mut self) -> LoopResult<Option<Vec<u8>>> {
        let mut buf = Vec::with_capacity(self.frame_len);
        Ok(self.read_frame_into(&mut buf)?.then_some(buf))
    }

    /// Stop the stream by terminating `ffmpeg`.
    pub fn kill(&mut self) -> LoopResult<()> {
        self.stdout = None;
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        if let Err(e) = child.kill()
            && e.kind() != std::io::ErrorKind::InvalidInput
        {
            return Err(LoopError::engine(format!("failed to kill ffmpeg: {e}")));
        }
        child
            .wait()
            .map_err(|e| LoopError::engine(format!("failed to wait for ffmpeg: {e}")))?;
        let _ = self.take_stderr();
        tracing::debug!(frames = self.frames_read, "ffmpeg killed");
        Ok(())
    }

    /// Close the stream and wait for `ffmpeg` to exit, reporting a failed exit status.
    ///
    /// Meant for streams that already ended; closing a live stream makes `ffmpeg` fail with a
    /// broken pipe, so use [`FrameStream::kill`] to cancel instead.
    pub fn finish(mut self) -> LoopResult<()> {
        self.stdout = None;
        self.reap()
    }

    fn reap(&mut self) -> LoopResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| LoopError::engine(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = self.take_stderr()?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(LoopError::engine(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        tracing::debug!(frames = self.frames_read, "ffmpeg finished");
        Ok(())
    }

    fn take_stderr(&mut self) -> LoopResult<Vec<u8>> {
        match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| LoopError::engine("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| LoopError::engine(format!("ffmpeg stderr read failed: {e}"))),
            None => Ok(Vec::new()),
        }
    }
}

impl Iterator for FrameStream {
    type Item = LoopResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

impl Drop for FrameStream {
    fn drop(&mut self) {
        if self.child.is_some() {
            let _ = self.kill();
        }
    }
}

impl std::fmt::Debug for FrameStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameStream")
            .field("pid", &self.pid())
            .field("frame_len", &self.frame_len)
            .field("frames_read", &self.frames_read)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/ffmpeg.rs"]
mod tests;
