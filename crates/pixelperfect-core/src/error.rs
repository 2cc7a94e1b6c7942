//! Error types for the PixelPerfect transform pipeline.
//!
//! Errors are organized by layer. [`TransformError`] is the per-request
//! taxonomy: every pipeline step returns it, and the first failure aborts the
//! request. Each variant carries enough context for a human-readable message,
//! and [`TransformError::kind`] gives the stable category name callers map to
//! a response status.

use thiserror::Error;

/// Top-level error type for PixelPerfect operations.
#[derive(Error, Debug)]
pub enum PixelPerfectError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transform pipeline errors
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Transform pipeline errors, one variant per failure category.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Input bytes are not a recognized, complete image
    #[error("Cannot decode image: {message}")]
    Decode { message: String },

    /// Crop rectangle is partial, negative, empty, or outside the source
    #[error("Invalid crop: {message}")]
    InvalidCrop { message: String },

    /// Target width or height is not positive
    #[error("Invalid target dimensions {width}x{height}: width and height must be > 0")]
    InvalidDimensions { width: i64, height: i64 },

    /// Quality outside the normalized 0.0-1.0 range
    #[error("Invalid quality {quality}: must be between 0.0 and 1.0")]
    InvalidQuality { quality: f32 },

    /// Target format is not one of the supported codecs
    #[error("Unsupported output format: {format}")]
    UnsupportedFormat { format: String },

    /// Source or target dimensions exceed the configured limit
    #[error("Image too large: {detail} (limit {max_dim}px per side)")]
    ImageTooLarge { detail: String, max_dim: u32 },

    /// The codec failed while serializing pixels
    #[error("Failed to encode {format}: {message}")]
    Encode { format: String, message: String },
}

impl TransformError {
    /// Stable category name for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "DecodeError",
            Self::InvalidCrop { .. } => "InvalidCropError",
            Self::InvalidDimensions { .. } => "InvalidDimensionsError",
            Self::InvalidQuality { .. } => "InvalidQualityError",
            Self::UnsupportedFormat { .. } => "UnsupportedFormatError",
            Self::ImageTooLarge { .. } => "ImageTooLargeError",
            Self::Encode { .. } => "EncodeError",
        }
    }

    pub(crate) fn invalid_crop(message: impl Into<String>) -> Self {
        Self::InvalidCrop {
            message: message.into(),
        }
    }
}

/// Convenience type alias for PixelPerfect results.
pub type Result<T> = std::result::Result<T, PixelPerfectError>;

/// Convenience type alias for pipeline-specific results.
pub type TransformResult<T> = std::result::Result<T, TransformError>;
