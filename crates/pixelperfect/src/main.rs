//! PixelPerfect - HTTP image resize and re-encode service.
//!
//! Accepts an uploaded image plus target dimensions, format and quality, and
//! returns the re-encoded image. The pixel work lives in `pixelperfect-core`;
//! this binary provides the HTTP surface, a one-shot CLI transform, and
//! configuration management.
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP service
//! pixelperfect serve --port 8000
//!
//! # Transform a single file
//! pixelperfect transform photo.png -o thumb.jpg --width 320 --height 240 --format image/jpeg
//!
//! # View configuration
//! pixelperfect config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;
mod server;

/// PixelPerfect - image resize and re-encode service.
#[derive(Parser, Debug)]
#[command(name = "pixelperfect")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long = "config", global = true, env = "PIXELPERFECT_CONFIG")]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP transform service
    Serve(cli::serve::ServeArgs),

    /// Transform a single image file
    Transform(cli::transform::TransformArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // An explicit --config must load; the default location falls back to
    // defaults. Logging isn't initialized yet, so use eprintln for warnings.
    let config = match &cli.config_file {
        Some(path) => pixelperfect_core::Config::load_from(&cli::expand_path(path))?,
        None => match pixelperfect_core::Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `pixelperfect config path`."
                );
                pixelperfect_core::Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("PixelPerfect v{}", pixelperfect_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Transform(args) => cli::transform::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, cli.config_file).await,
    }
}
