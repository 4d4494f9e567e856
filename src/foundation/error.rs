/// Result alias used across the crate.
pub type StudioResult<T> = Result<T, StudioError>;

/// Errors surfaced to callers of the engine.
///
/// Operator-facing mistakes (unknown scene ids, rejected transitions) are never reported through
/// this type; they are logged and ignored so the live output keeps running. Only caller misuse
/// and input validation end up here.
#[derive(thiserror::Error, Debug)]
pub enum StudioError {
    /// Invalid configuration, descriptor or settings input.
    #[error("validation error: {0}")]
    Validation(String),

    /// An operation issued in a mode where it is not legal (e.g. preview while studio mode is off).
    #[error("illegal mode operation: {0}")]
    IllegalMode(String),

    /// Pixel content could not be produced or has an inconsistent shape.
    #[error("content error: {0}")]
    Content(String),

    /// (De)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StudioError {
    /// Build a [`StudioError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StudioError::IllegalMode`].
    pub fn illegal_mode(msg: impl Into<String>) -> Self {
        Self::IllegalMode(msg.into())
    }

    /// Build a [`StudioError::Content`].
    pub fn content(msg: impl Into<String>) -> Self {
        Self::Content(msg.into())
    }

    /// Build a [`StudioError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
