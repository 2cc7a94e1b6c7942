//! Pixel mode normalization against the target codec's capabilities.
//!
//! Rasters the codec can store as-is pass through untouched. Otherwise:
//!
//! | Target | Alpha | 16-bit | Float |
//! |---|---|---|---|
//! | JPEG | composited onto the background | reduced to 8-bit | reduced to 8-bit |
//! | PNG | kept | kept | reduced to 16-bit |
//! | WebP | kept | reduced to 8-bit | reduced to 8-bit |

use image::{ColorType, DynamicImage, Rgb, RgbImage, RgbaImage};

use crate::config::EncodingConfig;
use crate::types::{PixelMode, Raster, TargetFormat};

/// Converts rasters into a mode the target codec accepts.
pub struct ColorNormalizer {
    background: [u8; 3],
}

impl ColorNormalizer {
    pub fn new(config: &EncodingConfig) -> Self {
        Self {
            background: config.jpeg_background,
        }
    }

    /// Total over every pixel mode; never fails.
    pub fn normalize(&self, raster: Raster, format: TargetFormat) -> Raster {
        let color = raster.image().color();
        if Self::is_native(color, format) {
            return raster;
        }

        let mode = raster.mode();
        let converted = match format {
            TargetFormat::Jpeg => self.to_jpeg_mode(raster.image(), mode),
            TargetFormat::Png => match mode {
                PixelMode::Grayscale => DynamicImage::ImageLuma16(raster.image().to_luma16()),
                PixelMode::GrayscaleAlpha => {
                    DynamicImage::ImageLumaA16(raster.image().to_luma_alpha16())
                }
                PixelMode::Rgb => DynamicImage::ImageRgb16(raster.image().to_rgb16()),
                PixelMode::Rgba => DynamicImage::ImageRgba16(raster.image().to_rgba16()),
            },
            TargetFormat::WebP => match mode {
                PixelMode::Grayscale => DynamicImage::ImageLuma8(raster.image().to_luma8()),
                PixelMode::GrayscaleAlpha => {
                    DynamicImage::ImageLumaA8(raster.image().to_luma_alpha8())
                }
                PixelMode::Rgb => DynamicImage::ImageRgb8(raster.image().to_rgb8()),
                PixelMode::Rgba => DynamicImage::ImageRgba8(raster.image().to_rgba8()),
            },
        };

        tracing::trace!(
            "Normalized {:?} to {:?} for {}",
            color,
            converted.color(),
            format.name()
        );
        raster.replace(converted)
    }

    fn is_native(color: ColorType, format: TargetFormat) -> bool {
        match format {
            TargetFormat::Jpeg => matches!(color, ColorType::L8 | ColorType::Rgb8),
            TargetFormat::Png => matches!(
                color,
                ColorType::L8
                    | ColorType::La8
                    | ColorType::Rgb8
                    | ColorType::Rgba8
                    | ColorType::L16
                    | ColorType::La16
                    | ColorType::Rgb16
                    | ColorType::Rgba16
            ),
            TargetFormat::WebP => matches!(
                color,
                ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8
            ),
        }
    }

    fn to_jpeg_mode(&self, image: &DynamicImage, mode: PixelMode) -> DynamicImage {
        match mode {
            PixelMode::Grayscale => DynamicImage::ImageLuma8(image.to_luma8()),
            PixelMode::Rgb => DynamicImage::ImageRgb8(image.to_rgb8()),
            PixelMode::GrayscaleAlpha => {
                let flat = DynamicImage::ImageRgb8(self.flatten(&image.to_rgba8()));
                DynamicImage::ImageLuma8(flat.to_luma8())
            }
            PixelMode::Rgba => DynamicImage::ImageRgb8(self.flatten(&image.to_rgba8())),
        }
    }

    /// Alpha-composite every pixel over the background color.
    fn flatten(&self, rgba: &RgbaImage) -> RgbImage {
        let bg = self.background;
        RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            let alpha = u32::from(a);
            let blend = |fg: u8, base: u8| {
                ((u32::from(fg) * alpha + u32::from(base) * (255 - alpha) + 127) / 255) as u8
            };
            Rgb([blend(r, bg[0]), blend(g, bg[1]), blend(b, bg[2])])
        })
    }
}
