/// Convenience result type used across the crate.
pub type CollageResult<T> = Result<T, CollageError>;

/// Top-level error taxonomy used by catalog and collage APIs.
#[derive(thiserror::Error, Debug)]
pub enum CollageError {
    /// Invalid user-provided configuration or catalog data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The schema source is unreadable or lacks a required message.
    #[error("schema error: {0}")]
    Schema(String),

    /// The parsed record tree could not be bound to typed records.
    #[error("binding error: {0}")]
    Binding(String),

    /// Fetching or decoding a single image failed.
    #[error("image error: {0}")]
    Image(String),

    /// Errors raised by the raster sink or during export.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CollageError {
    /// Build a [`CollageError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CollageError::Schema`] value.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Build a [`CollageError::Binding`] value.
    pub fn binding(msg: impl Into<String>) -> Self {
        Self::Binding(msg.into())
    }

    /// Build a [`CollageError::Image`] value.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// Build a [`CollageError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CollageError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
