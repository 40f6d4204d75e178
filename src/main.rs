//! `styleprep` CLI - prepare content and style images for style transfer.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ndarray::{ArrayBase, Data, Dimension};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use styleprep::image::save_mask;
use styleprep::{DataLoader, SegmentationMode};

/// Load, resize, segment and normalize a content/style image pair.
#[derive(Parser, Debug)]
#[command(name = "styleprep")]
#[command(version, about, long_about = None)]
struct Args {
    /// Content image path.
    #[arg(value_name = "CONTENT")]
    content: PathBuf,

    /// Style image path.
    #[arg(value_name = "STYLE")]
    style: PathBuf,

    /// Edge length of the square output arrays.
    #[arg(short, long, default_value = "400", value_name = "INT")]
    size: u32,

    /// Segmentation mode (v1: foreground mask, v2: labelled regions).
    #[arg(short, long, default_value = "v1", value_name = "MODE")]
    mode: SegmentationMode,

    /// Write the segmentation mask to this image file.
    #[arg(long, value_name = "PATH")]
    mask_out: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("styleprep={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    let mut loader = DataLoader::new(args.size).context("Failed to create data loader")?;

    loader
        .prepare_data(&args.content, &args.style, args.mode)
        .context("Failed to prepare data")?;

    let content = loader.content().and_then(|c| c.as_normalized());
    let style = loader.style().and_then(|s| s.as_normalized());
    let mask = loader.seg_mask().and_then(|m| m.as_normalized());

    if let Some(content) = content {
        report("content", content);
    }
    if let Some(style) = style {
        report("style", style);
    }
    if let Some(mask) = mask {
        report("mask", mask);

        if let Some(ref path) = args.mask_out {
            save_mask(mask.view(), path)
                .with_context(|| format!("Failed to write mask to {}", path.display()))?;
            println!("Mask written to {}", path.display());
        }
    }

    Ok(())
}

/// Print the shape and value range of a prepared array.
fn report<S, D>(name: &str, array: &ArrayBase<S, D>)
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    let min = array.iter().copied().fold(f32::INFINITY, f32::min);
    let max = array.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    println!("{name}: shape {:?}, range [{min:.3}, {max:.3}]", array.shape());
}
