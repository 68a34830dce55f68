//! Error types for Blossom

use thiserror::Error;

/// The main error type for Blossom operations
#[derive(Debug, Error)]
pub enum BlossomError {
    #[error("Drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Unknown preset: {name} (expected one of {allowed:?})")]
    UnknownPreset { name: String, allowed: Vec<String> },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

/// Result type alias for Blossom operations
pub type Result<T> = std::result::Result<T, BlossomError>;

impl From<toml::de::Error> for BlossomError {
    fn from(err: toml::de::Error) -> Self {
        BlossomError::TomlParseError(err.to_string())
    }
}
