/// Convenience result type used across toonloop.
pub type ToonResult<T> = Result<T, ToonError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Recoverable conditions inside the pipeline (unrecognized descriptions, missing body parts,
/// unresolvable conditions, frame-share rounding) never reach this type; they are corrected in
/// place and logged.
#[derive(thiserror::Error, Debug)]
pub enum ToonError {
    /// Malformed structural input (zero frames requested, empty canvas, bad weights).
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid configuration data such as vocabulary tables or option files.
    #[error("config error: {0}")]
    Config(String),

    /// Errors while rasterizing or handing off frame buffers.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ToonError {
    /// Build a [`ToonError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ToonError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`ToonError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ToonError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
