/// Convenience result type used across photogrid.
pub type PhotoGridResult<T> = Result<T, PhotoGridError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum PhotoGridError {
    /// Invalid user-provided settings or session mutations.
    #[error("validation error: {0}")]
    Validation(String),

    /// Grid or cell geometry that cannot hold a photo.
    #[error("layout error: {0}")]
    Layout(String),

    /// A photo, overlay or background could not be read or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Template or background resolution failed.
    #[error("template error: {0}")]
    Template(String),

    /// Errors while painting into a raster surface.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while encoding the exported raster.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing catalogs and jobs.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PhotoGridError {
    /// Build a [`PhotoGridError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PhotoGridError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`PhotoGridError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PhotoGridError::Template`] value.
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    /// Build a [`PhotoGridError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PhotoGridError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`PhotoGridError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
