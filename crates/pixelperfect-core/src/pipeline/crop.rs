//! Rectangular crop in source coordinates, applied before any resampling.

use crate::error::{TransformError, TransformResult};
use crate::types::{CropRect, Raster};

/// Extracts a sub-region of a raster.
pub struct Cropper;

impl Cropper {
    /// Apply `crop` if present; `None` passes the raster through untouched.
    pub fn apply(raster: Raster, crop: Option<&CropRect>) -> TransformResult<Raster> {
        let Some(rect) = crop else {
            return Ok(raster);
        };
        Self::check_bounds(rect, raster.width(), raster.height())?;

        let cropped = raster
            .image()
            .crop_imm(rect.x, rect.y, rect.width, rect.height);
        tracing::trace!(
            "Cropped {}x{} to {}x{} at ({}, {})",
            raster.width(),
            raster.height(),
            rect.width,
            rect.height,
            rect.x,
            rect.y
        );
        Ok(raster.replace(cropped))
    }

    /// `crop_imm` silently clamps; out-of-bounds regions must fail instead.
    fn check_bounds(rect: &CropRect, width: u32, height: u32) -> TransformResult<()> {
        if rect.width == 0 || rect.height == 0 {
            return Err(TransformError::invalid_crop(format!(
                "crop region {}x{} has zero area",
                rect.width, rect.height
            )));
        }
        let right = u64::from(rect.x) + u64::from(rect.width);
        let bottom = u64::from(rect.y) + u64::from(rect.height);
        if right > u64::from(width) {
            return Err(TransformError::invalid_crop(format!(
                "crop_x + crop_w = {} exceeds source width {}",
                right, width
            )));
        }
        if bottom > u64::from(height) {
            return Err(TransformError::invalid_crop(format!(
                "crop_y + crop_h = {} exceeds source height {}",
                bottom, height
            )));
        }
        Ok(())
    }
}
