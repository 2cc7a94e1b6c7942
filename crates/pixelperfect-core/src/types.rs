//! Core data types for the PixelPerfect transform pipeline.
//!
//! Raw parameters arrive as [`TransformParams`], are validated into a
//! [`TransformRequest`], and drive a [`Raster`] through the pipeline until it
//! becomes an [`EncodedOutput`].

use image::{ColorType, DynamicImage, ImageFormat};

use crate::error::TransformError;

/// Channel layout of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMode {
    Grayscale,
    GrayscaleAlpha,
    Rgb,
    Rgba,
}

impl PixelMode {
    /// Classify a decoded color type. Float and 16-bit types keep their layout.
    pub fn from_color(color: ColorType) -> Self {
        match color {
            ColorType::L8 | ColorType::L16 => Self::Grayscale,
            ColorType::La8 | ColorType::La16 => Self::GrayscaleAlpha,
            ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => Self::Rgb,
            _ => Self::Rgba,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, Self::GrayscaleAlpha | Self::Rgba)
    }
}

/// A decoded pixel grid plus the container format it came from.
///
/// Each pipeline step consumes the raster and returns its replacement.
#[derive(Debug, Clone)]
pub struct Raster {
    image: DynamicImage,
    source_format: ImageFormat,
}

impl Raster {
    pub fn new(image: DynamicImage, source_format: ImageFormat) -> Self {
        Self {
            image,
            source_format,
        }
    }

    /// Build a new raster that keeps this raster's source format.
    pub fn replace(self, image: DynamicImage) -> Self {
        Self::new(image, self.source_format)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn mode(&self) -> PixelMode {
        PixelMode::from_color(self.image.color())
    }

    pub fn bytes_per_pixel(&self) -> u8 {
        self.image.color().bytes_per_pixel()
    }

    /// Container format detected while decoding.
    pub fn source_format(&self) -> ImageFormat {
        self.source_format
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }
}

/// Rectangular region of the source raster, in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Normalized encode quality in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality(f32);

impl Quality {
    /// Accept a normalized quality, rejecting NaN and out-of-range values.
    pub fn new(value: f32) -> Result<Self, TransformError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TransformError::InvalidQuality { quality: value })
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Linear mapping onto the 1-100 codec scale.
    pub fn codec_value(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.9)
    }
}

/// Output codecs this service can encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Jpeg,
    Png,
    WebP,
}

impl TargetFormat {
    /// Derive the codec from a MIME-style identifier such as `image/jpeg`.
    ///
    /// Only the subtype after the last `/` is considered, case-insensitively.
    pub fn from_mime(format: &str) -> Result<Self, TransformError> {
        let subtype = format.rsplit('/').next().unwrap_or(format).trim();
        match subtype.to_ascii_uppercase().as_str() {
            "JPEG" | "JPG" => Ok(Self::Jpeg),
            "PNG" => Ok(Self::Png),
            "WEBP" => Ok(Self::WebP),
            other => Err(TransformError::UnsupportedFormat {
                format: if other.is_empty() {
                    format.to_string()
                } else {
                    other.to_string()
                },
            }),
        }
    }

    /// Upper-case codec name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::WebP => "WEBP",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }

    /// Whether the codec can store an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, Self::Jpeg)
    }

    /// Whether the codec can store 16 bits per channel.
    pub fn supports_16bit(self) -> bool {
        matches!(self, Self::Png)
    }
}

/// Codec-specific encoder settings. Each variant carries only the options
/// that codec understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncodeOptions {
    Jpeg { quality: Quality, progressive: bool },
    Png { optimize: bool },
    /// The WebP encoder is lossless only, so quality is approximated by
    /// quantizing color channels before encoding rather than passed to a
    /// lossy quality scale.
    WebP { quality: Quality },
}

impl EncodeOptions {
    pub fn format(&self) -> TargetFormat {
        match self {
            Self::Jpeg { .. } => TargetFormat::Jpeg,
            Self::Png { .. } => TargetFormat::Png,
            Self::WebP { .. } => TargetFormat::WebP,
        }
    }
}

/// Unvalidated parameters as delivered by the HTTP form or the CLI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformParams {
    pub width: i64,
    pub height: i64,
    /// MIME-style identifier, e.g. `image/jpeg`
    pub format: String,
    pub quality: f32,
    pub crop_x: Option<i64>,
    pub crop_y: Option<i64>,
    pub crop_w: Option<i64>,
    pub crop_h: Option<i64>,
    pub progressive_jpeg: bool,
    pub optimize_png: bool,
}

/// Validated parameters for one transform.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRequest {
    pub width: u32,
    pub height: u32,
    pub crop: Option<CropRect>,
    pub options: EncodeOptions,
    /// The format string exactly as requested; echoed as the output media type
    pub media_type: String,
}

impl TransformRequest {
    pub fn target_format(&self) -> TargetFormat {
        self.options.format()
    }
}

/// Encoded bytes plus the media type declared to the caller.
#[derive(Debug, Clone)]
pub struct EncodedOutput {
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub width: u32,
    pub height: u32,
}
