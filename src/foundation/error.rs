/// Convenience result type used across Posterkit.
pub type PosterResult<T> = Result<T, PosterError>;

/// Top-level error taxonomy used by editor APIs.
#[derive(thiserror::Error, Debug)]
pub enum PosterError {
    /// Invalid configuration, transform or pointer input.
    #[error("validation error: {0}")]
    Validation(String),

    /// An image source could not be decoded into a bitmap.
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors raised while drawing into a surface.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while encoding or writing an exported raster.
    #[error("export error: {0}")]
    Export(String),

    /// The platform share capability is missing or refused the payload.
    #[error("share error: {0}")]
    Share(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PosterError {
    /// Build a [`PosterError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PosterError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PosterError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PosterError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`PosterError::Share`] value.
    pub fn share(msg: impl Into<String>) -> Self {
        Self::Share(msg.into())
    }

    /// Build a [`PosterError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
