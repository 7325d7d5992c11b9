/// Convenience result type used across Framery.
pub type FrameryResult<T> = Result<T, FrameryError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// A [`FrameryError::Render`] or [`FrameryError::Sink`] raised inside the
/// engine is fatal to the whole stream: the engine latches the first one, stops
/// scheduling work and reports it from [`close`](crate::ParallelEngine::close).
#[derive(thiserror::Error, Debug)]
pub enum FrameryError {
    /// Invalid caller-provided data or API misuse.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while parsing or advancing timecodes.
    #[error("timecode error: {0}")]
    Timecode(String),

    /// A render step failed for a specific frame.
    #[error("render error: {0}")]
    Render(String),

    /// The output commit for an already-ordered frame failed.
    #[error("sink error: {0}")]
    Sink(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FrameryError {
    /// Build a [`FrameryError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FrameryError::Timecode`] value.
    pub fn timecode(msg: impl Into<String>) -> Self {
        Self::Timecode(msg.into())
    }

    /// Build a [`FrameryError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FrameryError::Sink`] value.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
