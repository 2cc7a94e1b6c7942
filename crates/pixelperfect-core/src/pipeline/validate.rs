//! Parameter validation: turns raw [`TransformParams`] into a
//! [`TransformRequest`] before any pixel work starts.
//!
//! Checks that need the decoded source (crop bounds) run later in the
//! cropper; everything knowable from the parameters alone is rejected here.

use crate::error::{TransformError, TransformResult};
use crate::types::{
    CropRect, EncodeOptions, Quality, TargetFormat, TransformParams, TransformRequest,
};

impl TransformParams {
    /// Validate the parameters and build the codec-specific options.
    ///
    /// Checks run in order: dimensions, quality, format, crop.
    pub fn validate(&self) -> TransformResult<TransformRequest> {
        let (width, height) = self.target_dimensions()?;
        let quality = Quality::new(self.quality)?;
        let format = TargetFormat::from_mime(&self.format)?;

        let options = match format {
            TargetFormat::Jpeg => EncodeOptions::Jpeg {
                quality,
                progressive: self.progressive_jpeg,
            },
            TargetFormat::Png => EncodeOptions::Png {
                optimize: self.optimize_png,
            },
            TargetFormat::WebP => EncodeOptions::WebP { quality },
        };

        Ok(TransformRequest {
            width,
            height,
            crop: self.crop_rect()?,
            options,
            media_type: self.format.clone(),
        })
    }

    fn target_dimensions(&self) -> TransformResult<(u32, u32)> {
        let invalid = || TransformError::InvalidDimensions {
            width: self.width,
            height: self.height,
        };
        if self.width <= 0 || self.height <= 0 {
            return Err(invalid());
        }
        let width = u32::try_from(self.width).map_err(|_| invalid())?;
        let height = u32::try_from(self.height).map_err(|_| invalid())?;
        Ok((width, height))
    }

    /// All four crop fields or none; a partial rectangle is an error.
    fn crop_rect(&self) -> TransformResult<Option<CropRect>> {
        let fields = [
            ("crop_x", self.crop_x),
            ("crop_y", self.crop_y),
            ("crop_w", self.crop_w),
            ("crop_h", self.crop_h),
        ];

        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();
        if missing.len() == fields.len() {
            return Ok(None);
        }
        if !missing.is_empty() {
            return Err(TransformError::invalid_crop(format!(
                "crop_x, crop_y, crop_w and crop_h must be given together; missing {}",
                missing.join(", ")
            )));
        }

        let mut values = [0u32; 4];
        for (slot, (name, value)) in values.iter_mut().zip(fields) {
            let value = value.unwrap_or_default();
            *slot = u32::try_from(value).map_err(|_| {
                TransformError::invalid_crop(format!(
                    "{} must be a non-negative integer, got {}",
                    name, value
                ))
            })?;
        }
        let [x, y, width, height] = values;
        if width == 0 || height == 0 {
            return Err(TransformError::invalid_crop(format!(
                "crop region {}x{} has zero area",
                width, height
            )));
        }

        Ok(Some(CropRect {
            x,
            y,
            width,
            height,
        }))
    }
}
