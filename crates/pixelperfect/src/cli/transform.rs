//! The `pixelperfect transform` command: runs the pipeline on a local file.

use anyhow::Context;
use clap::Args;
use pixelperfect_core::{Config, ImageTransformer, TransformParams};
use std::path::PathBuf;

use super::expand_path;

/// Arguments for the `transform` command.
#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Source image
    #[arg(required = true)]
    pub input: PathBuf,

    /// Where to write the encoded result
    #[arg(short, long)]
    pub output: PathBuf,

    /// Target width in pixels
    #[arg(long, allow_negative_numbers = true)]
    pub width: i64,

    /// Target height in pixels
    #[arg(long, allow_negative_numbers = true)]
    pub height: i64,

    /// Output format as a media type (image/jpeg, image/png, image/webp)
    #[arg(short, long, default_value = "image/jpeg")]
    pub format: String,

    /// Encode quality between 0.0 and 1.0
    #[arg(short, long, default_value = "0.9", allow_negative_numbers = true)]
    pub quality: f32,

    /// Crop region in source pixels, applied before resizing
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_crop)]
    pub crop: Option<[i64; 4]>,

    /// Write a progressive JPEG
    #[arg(long)]
    pub progressive: bool,

    /// Spend more time on PNG compression
    #[arg(long)]
    pub optimize: bool,
}

impl TransformArgs {
    fn params(&self) -> TransformParams {
        let crop = self.crop;
        TransformParams {
            width: self.width,
            height: self.height,
            format: self.format.clone(),
            quality: self.quality,
            crop_x: crop.map(|c| c[0]),
            crop_y: crop.map(|c| c[1]),
            crop_w: crop.map(|c| c[2]),
            crop_h: crop.map(|c| c[3]),
            progressive_jpeg: self.progressive,
            optimize_png: self.optimize,
        }
    }
}

/// Parse `X,Y,W,H` into four integers.
fn parse_crop(value: &str) -> Result<[i64; 4], String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid crop '{}': {}", value, e))?;
    <[i64; 4]>::try_from(parts)
        .map_err(|parts| format!("crop needs 4 values (X,Y,W,H), got {}", parts.len()))
}

/// Execute the transform command.
pub async fn execute(args: TransformArgs, config: Config) -> anyhow::Result<()> {
    let input = expand_path(&args.input);
    let output_path = expand_path(&args.output);
    let params = args.params();

    let bytes = tokio::fs::read(&input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let transformer = ImageTransformer::new(&config);
    let output = tokio::task::spawn_blocking(move || transformer.transform_params(bytes, &params))
        .await??;

    tokio::fs::write(&output_path, &output.bytes)
        .await
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    tracing::info!(
        "Wrote {} ({}x{}, {}, {} bytes)",
        output_path.display(),
        output.width,
        output.height,
        output.media_type,
        output.bytes.len()
    );
    Ok(())
}
