/// Convenience result type used across ffloop.
pub type LoopResult<T> = Result<T, LoopError>;

/// Top-level error taxonomy used by the planning and engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum LoopError {
    /// Invalid caller-provided options, reported before any process is spawned.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failures while spawning or talking to the `ffmpeg` process.
    #[error("engine error: {0}")]
    Engine(String),

    /// Errors when serializing or deserializing options and plans.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LoopError {
    /// Build a [`LoopError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LoopError::Engine`] value.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Build a [`LoopError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
