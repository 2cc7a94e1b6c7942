//! Image decoding with content-based format detection and size limits.

use image::{ImageError, ImageFormat, ImageReader, Limits};
use std::io::Cursor;

use crate::config::LimitsConfig;
use crate::error::{TransformError, TransformResult};
use crate::types::Raster;

/// Decodes uploaded bytes into a [`Raster`].
///
/// The container format is sniffed from the bytes themselves and never from
/// the requested output format.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an in-memory buffer. The buffer is consumed.
    pub fn decode(&self, bytes: Vec<u8>) -> TransformResult<Raster> {
        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| TransformError::Decode {
                message: format!("Cannot read image header: {}", e),
            })?;

        let format = reader.format().ok_or_else(|| TransformError::Decode {
            message: "Unrecognized image format".to_string(),
        })?;
        reader.limits(self.decoder_limits());

        let image = reader.decode().map_err(|e| match e {
            ImageError::Limits(limit) => TransformError::ImageTooLarge {
                detail: limit.to_string(),
                max_dim: self.limits.max_image_dimension,
            },
            other => TransformError::Decode {
                message: other.to_string(),
            },
        })?;

        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(TransformError::Decode {
                message: format!("Image has zero area ({}x{})", width, height),
            });
        }
        if width > self.limits.max_image_dimension || height > self.limits.max_image_dimension {
            return Err(TransformError::ImageTooLarge {
                detail: format!("source is {}x{}", width, height),
                max_dim: self.limits.max_image_dimension,
            });
        }

        tracing::trace!(
            "Decoded {} {}x{} ({:?})",
            format_to_string(format),
            width,
            height,
            image.color()
        );
        Ok(Raster::new(image, format))
    }

    fn decoder_limits(&self) -> Limits {
        let mut limits = Limits::default();
        limits.max_image_width = Some(self.limits.max_image_dimension);
        limits.max_image_height = Some(self.limits.max_image_dimension);
        limits
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Bmp => "bmp",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PixelMode;
    use image::{DynamicImage, RgbaImage};

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
    }

    #[test]
    fn test_decode_png_keeps_alpha() {
        let source = DynamicImage::ImageRgba8(RgbaImage::new(12, 7));
        let decoder = ImageDecoder::new(LimitsConfig::default());

        let raster = decoder.decode(png_bytes(&source)).unwrap();
        assert_eq!((raster.width(), raster.height()), (12, 7));
        assert_eq!(raster.mode(), PixelMode::Rgba);
        assert_eq!(raster.source_format(), ImageFormat::Png);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let err = decoder.decode(b"definitely not an image".to_vec()).unwrap_err();
        assert_eq!(err.kind(), "DecodeError");
    }

    #[test]
    fn test_decode_rejects_truncated_png() {
        let mut bytes = png_bytes(&DynamicImage::new_rgb8(64, 64));
        bytes.truncate(40);
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let err = decoder.decode(bytes).unwrap_err();
        assert_eq!(err.kind(), "DecodeError");
    }

    #[test]
    fn test_decode_rejects_empty_buffer() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        assert!(decoder.decode(Vec::new()).is_err());
    }

    #[test]
    fn test_decode_enforces_dimension_limit() {
        let limits = LimitsConfig {
            max_image_dimension: 32,
            ..LimitsConfig::default()
        };
        let decoder = ImageDecoder::new(limits);
        let err = decoder
            .decode(png_bytes(&DynamicImage::new_rgb8(64, 16)))
            .unwrap_err();
        assert_eq!(err.kind(), "ImageTooLargeError");
    }
}
