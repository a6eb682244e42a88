//! `lux` - render the built-in demo scene progressively and save a PNG.

mod demo;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use image::RgbaImage;
use lux_core::SkySettings;
use lux_renderer::{render_pass, RenderSettings, RenderState, Renderer};

#[derive(Debug, Parser)]
#[command(name = "lux", version, about = "Progressive path tracer for the LUX demo scene")]
struct Args {
    /// Image width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 360)]
    height: u32,

    /// Number of full-frame passes (samples per pixel)
    #[arg(long, default_value_t = 64)]
    passes: u32,

    /// Output PNG path
    #[arg(short, long, default_value = "lux.png")]
    output: PathBuf,

    /// JSON file with render settings; omitted fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log per-pass timing
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => RenderSettings::default(),
    };
    log::info!("Render settings: {:?}", settings);

    let scene = demo::build_scene(args.width, args.height, SkySettings::default())
        .context("Failed to build demo scene")?;
    let renderer = Renderer::new(settings).context("Invalid render settings")?;
    let state = RenderState::new(args.width, args.height);

    log::info!(
        "Rendering {}x{} for {} passes",
        args.width,
        args.height,
        args.passes
    );
    let start = Instant::now();
    for _ in 0..args.passes {
        render_pass(&renderer, &scene, &state)?;
    }
    log::info!(
        "Rendered {} passes in {:.2?}",
        state.passes(),
        start.elapsed()
    );

    let image = to_rgba_image(args.width, args.height, &state.snapshot_display())
        .context("Display buffer does not match image size")?;
    image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}

fn load_settings(path: &Path) -> Result<RenderSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Convert a BGRA display buffer into an RGBA image.
fn to_rgba_image(width: u32, height: u32, bgra: &[u8]) -> Option<RgbaImage> {
    let rgba = bgra
        .chunks_exact(4)
        .flat_map(|p| [p[2], p[1], p[0], p[3]])
        .collect();
    RgbaImage::from_raw(width, height, rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rgba_swaps_channels() {
        let image = to_rgba_image(2, 1, &[10, 20, 30, 255, 0, 0, 255, 255]).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [30, 20, 10, 255]);
        assert_eq!(image.get_pixel(1, 0).0, [255, 0, 0, 255]);
        assert!(to_rgba_image(2, 2, &[0; 8]).is_none());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["lux", "--width", "32", "--passes", "2", "-v"]);
        assert_eq!(args.width, 32);
        assert_eq!(args.height, 360);
        assert_eq!(args.passes, 2);
        assert!(args.verbose);
        assert!(args.config.is_none());
    }
}
