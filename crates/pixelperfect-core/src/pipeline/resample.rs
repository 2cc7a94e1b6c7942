//! Exact-size resampling with a Lanczos (a=3) windowed-sinc filter.

use image::imageops::FilterType;

use crate::types::Raster;

/// Resizes rasters to exact target dimensions.
pub struct Resampler;

impl Resampler {
    /// Filter used for every resize.
    pub const FILTER: FilterType = FilterType::Lanczos3;

    /// Resize to exactly `width` x `height`, ignoring aspect ratio.
    ///
    /// Runs even when the size is unchanged, so output always passes through
    /// the same filter.
    pub fn resize(raster: Raster, width: u32, height: u32) -> Raster {
        let resized = raster.image().resize_exact(width, height, Self::FILTER);
        tracing::trace!(
            "Resampled {}x{} to {}x{}",
            raster.width(),
            raster.height(),
            width,
            height
        );
        raster.replace(resized)
    }
}
