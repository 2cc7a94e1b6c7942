//! PixelPerfect Core - synchronous image transform library.
//!
//! Takes an uploaded image buffer plus geometric/encoding parameters and
//! produces a re-encoded image in the requested format.
//!
//! # Architecture
//!
//! A strictly linear pipeline with no I/O and no shared state:
//!
//! ```text
//! Bytes → Decode → Crop → Normalize → Resample (Lanczos3) → Encode → Bytes
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use pixelperfect_core::{Config, ImageTransformer, TransformParams};
//!
//! let transformer = ImageTransformer::new(&Config::default());
//! let params = TransformParams {
//!     width: 50,
//!     height: 50,
//!     format: "image/jpeg".into(),
//!     quality: 0.8,
//!     ..TransformParams::default()
//! };
//! let output = transformer.transform_params(std::fs::read("in.png")?, &params)?;
//! std::fs::write("out.jpg", &output.bytes)?;
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PixelPerfectError, Result, TransformError, TransformResult};
pub use pipeline::ImageTransformer;
pub use types::{
    CropRect, EncodeOptions, EncodedOutput, PixelMode, Quality, Raster, TargetFormat,
    TransformParams, TransformRequest,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
