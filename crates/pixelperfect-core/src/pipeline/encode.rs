//! Format-specific serialization of a resampled raster.
//!
//! | Target | Crate | Options honored |
//! |---|---|---|
//! | JPEG | `jpeg-encoder` | quality, progressive scans |
//! | PNG | `image` (`PngEncoder`) | optimize (deeper deflate search) |
//! | WebP | `image` (`WebPEncoder`, lossless) | quality (pre-quantized channels) |

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::DynamicImage;

use crate::error::{TransformError, TransformResult};
use crate::types::{EncodeOptions, Quality, Raster, TargetFormat};

/// Serializes rasters into the requested codec.
pub struct Encoder;

impl Encoder {
    /// Encode a raster whose pixel mode has already been normalized for the
    /// target codec.
    pub fn encode(raster: Raster, options: &EncodeOptions) -> TransformResult<Vec<u8>> {
        let image = raster.into_image();
        let bytes = match *options {
            EncodeOptions::Jpeg {
                quality,
                progressive,
            } => encode_jpeg(&image, quality, progressive)?,
            EncodeOptions::Png { optimize } => encode_png(&image, optimize)?,
            EncodeOptions::WebP { quality } => encode_webp(image, quality)?,
        };
        tracing::trace!("Encoded {} ({} bytes)", options.format().name(), bytes.len());
        Ok(bytes)
    }
}

fn encode_error(format: TargetFormat, message: impl ToString) -> TransformError {
    TransformError::Encode {
        format: format.name().to_string(),
        message: message.to_string(),
    }
}

fn encode_jpeg(image: &DynamicImage, quality: Quality, progressive: bool) -> TransformResult<Vec<u8>> {
    let (color, data) = match image {
        DynamicImage::ImageLuma8(buf) => (jpeg_encoder::ColorType::Luma, buf.as_raw()),
        DynamicImage::ImageRgb8(buf) => (jpeg_encoder::ColorType::Rgb, buf.as_raw()),
        other => {
            return Err(encode_error(
                TargetFormat::Jpeg,
                format!("unsupported pixel layout {:?}", other.color()),
            ))
        }
    };
    // Baseline and progressive JPEG both cap dimensions at 16 bits.
    let width = u16::try_from(image.width())
        .map_err(|_| encode_error(TargetFormat::Jpeg, "width exceeds 65535"))?;
    let height = u16::try_from(image.height())
        .map_err(|_| encode_error(TargetFormat::Jpeg, "height exceeds 65535"))?;

    let mut buffer = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut buffer, quality.codec_value());
    encoder.set_progressive(progressive);
    encoder.set_optimized_huffman_tables(true);
    encoder
        .encode(data, width, height, color)
        .map_err(|e| encode_error(TargetFormat::Jpeg, e))?;
    Ok(buffer)
}

fn encode_png(image: &DynamicImage, optimize: bool) -> TransformResult<Vec<u8>> {
    let compression = if optimize {
        CompressionType::Best
    } else {
        CompressionType::Fast
    };
    let mut buffer = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buffer, compression, FilterType::Adaptive);
    image
        .write_with_encoder(encoder)
        .map_err(|e| encode_error(TargetFormat::Png, e))?;
    Ok(buffer)
}

fn encode_webp(mut image: DynamicImage, quality: Quality) -> TransformResult<Vec<u8>> {
    quantize_for_webp(&mut image, quality.codec_value());
    let mut buffer = Vec::new();
    image
        .write_with_encoder(WebPEncoder::new_lossless(&mut buffer))
        .map_err(|e| encode_error(TargetFormat::WebP, e))?;
    Ok(buffer)
}

/// The pure-Rust WebP encoder is lossless only. Below full quality, color
/// channels are snapped to fewer levels so the lossless coder compresses
/// harder. Alpha is never quantized.
fn quantize_for_webp(image: &mut DynamicImage, quality: u8) {
    if quality >= 100 {
        return;
    }
    let (data, stride, color_channels): (&mut [u8], usize, usize) = match image {
        DynamicImage::ImageLuma8(buf) => (&mut **buf, 1, 1),
        DynamicImage::ImageLumaA8(buf) => (&mut **buf, 2, 1),
        DynamicImage::ImageRgb8(buf) => (&mut **buf, 3, 3),
        DynamicImage::ImageRgba8(buf) => (&mut **buf, 4, 3),
        _ => return,
    };

    let step = 255.0 / (f32::from(webp_levels(quality)) - 1.0);
    for pixel in data.chunks_exact_mut(stride) {
        for channel in pixel.iter_mut().take(color_channels) {
            let bucket = (f32::from(*channel) / step).round();
            *channel = (bucket * step).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Levels per channel; quadratic so high qualities stay close to lossless.
fn webp_levels(quality: u8) -> u16 {
    if quality >= 100 {
        return 256;
    }
    let normalized = f32::from(quality.clamp(1, 100)) / 100.0;
    let levels = 2.0 + normalized * normalized * 254.0;
    levels.round().clamp(2.0, 256.0) as u16
}
