//! Error taxonomy for asset and configuration loading.
//!
//! Runtime loops (effect refresh, playback, blink) never surface errors
//! through this type; they contain failures at the task boundary and log
//! them. Only startup paths (manifest, image decode, config parse) return
//! `Result`.

/// Result alias that carries the crate-wide [`VisorError`] type.
pub type Result<T> = std::result::Result<T, VisorError>;

/// Common error type for asset and configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum VisorError {
    /// Wrapper around standard IO errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The expression manifest was missing a field or malformed.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// The config file could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl VisorError {
    /// Creates a manifest error wrapping the provided message.
    pub fn manifest(msg: impl Into<String>) -> Self {
        Self::Manifest(msg.into())
    }

    /// Creates a config error wrapping the provided message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_json::Error> for VisorError {
    fn from(value: serde_json::Error) -> Self {
        Self::Manifest(value.to_string())
    }
}
