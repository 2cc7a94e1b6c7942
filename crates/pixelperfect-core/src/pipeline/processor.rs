//! Pipeline orchestration - runs decode, crop, normalize, resample and encode
//! in strict sequence for one request.

use std::time::Instant;

use crate::config::{Config, LimitsConfig};
use crate::error::{TransformError, TransformResult};
use crate::types::{EncodedOutput, TransformParams, TransformRequest};

use super::crop::Cropper;
use super::decode::{format_to_string, ImageDecoder};
use super::encode::Encoder;
use super::normalize::ColorNormalizer;
use super::resample::Resampler;

/// The image transformer that owns the per-step components.
///
/// Holds no per-request state, so one instance can serve concurrent
/// requests from multiple threads.
pub struct ImageTransformer {
    decoder: ImageDecoder,
    normalizer: ColorNormalizer,
    limits: LimitsConfig,
}

impl ImageTransformer {
    /// Create a new transformer with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            normalizer: ColorNormalizer::new(&config.encoding),
            limits: config.limits.clone(),
        }
    }

    /// Validate raw parameters, then run the pipeline.
    pub fn transform_params(
        &self,
        bytes: Vec<u8>,
        params: &TransformParams,
    ) -> TransformResult<EncodedOutput> {
        let request = params.validate()?;
        self.transform(bytes, &request)
    }

    /// Run the full pipeline on an uploaded buffer.
    ///
    /// Aborts at the first failing step; no partial output is produced.
    pub fn transform(
        &self,
        bytes: Vec<u8>,
        request: &TransformRequest,
    ) -> TransformResult<EncodedOutput> {
        let start = Instant::now();
        self.check_target_size(request)?;
        let input_size = bytes.len();

        // Decode
        let raster = self.decoder.decode(bytes)?;
        let source = (raster.width(), raster.height());
        let source_format = raster.source_format();
        tracing::trace!("  Decode: {:?}", start.elapsed());

        // Crop (source coordinates, so always before resampling)
        let step = Instant::now();
        let raster = Cropper::apply(raster, request.crop.as_ref())?;
        tracing::trace!("  Crop: {:?}", step.elapsed());

        // Normalize
        let step = Instant::now();
        let raster = self.normalizer.normalize(raster, request.target_format());
        tracing::trace!("  Normalize: {:?}", step.elapsed());

        // Resample
        let step = Instant::now();
        let raster = Resampler::resize(raster, request.width, request.height);
        tracing::trace!("  Resample: {:?}", step.elapsed());

        // Encode
        let step = Instant::now();
        let (width, height) = (raster.width(), raster.height());
        let bytes = Encoder::encode(raster, &request.options)?;
        tracing::trace!("  Encode: {:?}", step.elapsed());

        tracing::debug!(
            "Transformed {} {}x{} ({} bytes) -> {} {}x{} ({} bytes) in {:?}",
            format_to_string(source_format),
            source.0,
            source.1,
            input_size,
            request.target_format().name(),
            width,
            height,
            bytes.len(),
            start.elapsed()
        );

        Ok(EncodedOutput {
            bytes,
            media_type: request.media_type.clone(),
            width,
            height,
        })
    }

    fn check_target_size(&self, request: &TransformRequest) -> TransformResult<()> {
        if request.width == 0 || request.height == 0 {
            return Err(TransformError::InvalidDimensions {
                width: i64::from(request.width),
                height: i64::from(request.height),
            });
        }
        let max_dim = self.limits.max_image_dimension;
        if request.width > max_dim || request.height > max_dim {
            return Err(TransformError::ImageTooLarge {
                detail: format!("target is {}x{}", request.width, request.height),
                max_dim,
            });
        }
        Ok(())
    }
}
