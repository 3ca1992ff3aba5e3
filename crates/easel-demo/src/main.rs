//! Easel: pixel-level image editing from the command line.
//!
//! Each subcommand loads an image, runs one edit through an
//! [`EditSession`](easel_core::EditSession), and writes the result as PNG.
//! `replay` drives the same editor the UI talks to with a file of JSON
//! messages.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use easel_core::KernelPreset;

mod commands;
mod config;
mod editor;
mod image_loader;
mod ipc;
mod worker;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "easel")]
#[command(author, version, about = "Pixel-level image editing")]
#[command(long_about = "
Convolution filters, two-point tone curves, nearest-neighbor resizing and
color inspection for raster images. Results are always written as PNG.

Examples:
  easel info photo.jpg
  easel filter photo.jpg -o sharp.png --preset sharpen
  easel filter photo.jpg -o edge.png --kernel \"-1,-1,-1;-1,8,-1;-1,-1,-1\"
  easel curves photo.jpg -o contrast.png --p1 40:0 --p2 215:255
  easel resize photo.jpg -o half.png --percent 50
  easel sample photo.jpg --x 10 --y 20 --x2 300 --y2 40
  easel contrast \"rgb(118, 118, 118)\" \"rgb(255, 255, 255)\"
  easel replay session.jsonl
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Directory that relative output paths resolve against
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Longest preview edge sent to the UI in `replay` (0 = full size)
    #[arg(long, global = true)]
    preview_max_edge: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dimensions, megapixels and histogram peaks
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Convolve with a preset or custom kernel
    Filter(FilterArgs),

    /// Apply a two-point tone curve
    Curves(CurvesArgs),

    /// Nearest-neighbor resize
    #[command(visible_alias = "r")]
    Resize(ResizeArgs),

    /// Inspect one or two pixels and their contrast ratio
    Sample(SampleArgs),

    /// Contrast ratio between two textual colors
    Contrast(ContrastArgs),

    /// Print the per-channel histogram
    Histogram(HistogramArgs),

    /// Feed newline-delimited JSON editor messages and print the replies
    Replay(ReplayArgs),

    /// Print the effective configuration as JSON
    Config,
}

#[derive(Args)]
struct InfoArgs {
    /// Input image
    input: PathBuf,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct FilterArgs {
    /// Input image
    input: PathBuf,

    /// Output PNG
    #[arg(short, long)]
    output: PathBuf,

    /// Built-in kernel: identity, sharpen, gaussian-blur, box-blur
    #[arg(long, conflicts_with = "kernel")]
    preset: Option<KernelPreset>,

    /// Custom square kernel, rows separated by ';' and weights by ','
    #[arg(long, allow_hyphen_values = true)]
    kernel: Option<String>,
}

#[derive(Args)]
struct CurvesArgs {
    /// Input image
    input: PathBuf,

    /// Output PNG
    #[arg(short, long)]
    output: PathBuf,

    /// Lower control point as IN:OUT
    #[arg(long, default_value = "0:0")]
    p1: commands::CurvePointArg,

    /// Upper control point as IN:OUT
    #[arg(long, default_value = "255:255")]
    p2: commands::CurvePointArg,
}

#[derive(Args)]
struct ResizeArgs {
    /// Input image
    input: PathBuf,

    /// Output PNG
    #[arg(short, long)]
    output: PathBuf,

    /// Scale both sides, 0 < P <= 100
    #[arg(long, conflicts_with_all = ["width", "height"])]
    percent: Option<f64>,

    /// Target width in pixels
    #[arg(long)]
    width: Option<f64>,

    /// Target height in pixels
    #[arg(long)]
    height: Option<f64>,

    /// Take width and height as given instead of keeping the aspect ratio
    #[arg(long)]
    unlink: bool,
}

#[derive(Args)]
struct SampleArgs {
    /// Input image
    input: PathBuf,

    /// Column of the first pixel
    #[arg(long)]
    x: u32,

    /// Row of the first pixel
    #[arg(long)]
    y: u32,

    /// Column of a second pixel to compare against
    #[arg(long, requires = "y2")]
    x2: Option<u32>,

    /// Row of a second pixel to compare against
    #[arg(long, requires = "x2")]
    y2: Option<u32>,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ContrastArgs {
    /// First color, e.g. "rgb(118, 118, 118)"; unparsable text counts as black
    color1: String,

    /// Second color
    color2: String,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct HistogramArgs {
    /// Input image
    input: PathBuf,

    /// Scale each channel so its tallest bin is 100
    #[arg(long)]
    normalized: bool,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ReplayArgs {
    /// File with one JSON message per line; blank lines and lines starting
    /// with '#' are skipped
    script: PathBuf,
}

fn init_tracing(config: &AppConfig, verbose: u8) {
    let directive = match verbose {
        0 => config.log_filter.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::default();
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(edge) = cli.preview_max_edge {
        config.preview_max_edge = edge;
    }
    init_tracing(&config, cli.verbose);

    match cli.command {
        Commands::Info(args) => commands::info(args),
        Commands::Filter(args) => commands::filter(args, &config),
        Commands::Curves(args) => commands::curves(args, &config),
        Commands::Resize(args) => commands::resize(args, &config),
        Commands::Sample(args) => commands::sample(args),
        Commands::Contrast(args) => commands::contrast(args),
        Commands::Histogram(args) => commands::histogram(args),
        Commands::Replay(args) => commands::replay(args, config).await,
        Commands::Config => commands::print_config(&config),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_normalized_help_matches_histogram_scale() {
        let cli = Cli::command();
        let histogram = cli.find_subcommand("histogram").unwrap();
        let normalized = histogram
            .get_arguments()
            .find(|arg| arg.get_id() == "normalized")
            .unwrap();
        let help = normalized.get_help().unwrap().to_string();
        assert!(help.ends_with("tallest bin is 100"), "{help}");
    }

    #[test]
    fn test_contrast_takes_two_colors() {
        let cli = Cli::try_parse_from(["easel", "contrast", "rgb(1, 2, 3)", "7 8 9", "--json"])
            .unwrap();
        match cli.command {
            Commands::Contrast(args) => {
                assert_eq!(args.color1, "rgb(1, 2, 3)");
                assert_eq!(args.color2, "7 8 9");
                assert!(args.json);
            }
            _ => panic!("expected the contrast subcommand"),
        }
    }
}
