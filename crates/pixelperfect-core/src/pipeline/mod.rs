//! Image transform pipeline components.
//!
//! One request flows through these stages in order:
//! - **validate**: Turn raw parameters into a `TransformRequest`
//! - **decode**: Sniff the container and decode bytes into a `Raster`
//! - **crop**: Optionally extract a sub-region in source coordinates
//! - **normalize**: Convert the pixel mode to one the target codec stores
//! - **resample**: Lanczos resize to the exact target dimensions
//! - **encode**: Serialize with codec-specific options
//! - **processor**: Orchestrates the full pipeline

pub mod crop;
pub mod decode;
pub mod encode;
pub mod normalize;
pub mod processor;
pub mod resample;
pub mod validate;

// Re-exports for convenient access
pub use crop::Cropper;
pub use decode::ImageDecoder;
pub use encode::Encoder;
pub use normalize::ColorNormalizer;
pub use processor::ImageTransformer;
pub use resample::Resampler;
