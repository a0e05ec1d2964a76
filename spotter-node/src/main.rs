// Object spotter command line interface

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use opencv::core::Mat;
use opencv::prelude::*;
use serde::Serialize;
use spotter_core::settings::read_document;
use spotter_core::{Header, MotherSettings, PointStamped};
use spotter_eye::utils::mat_to_bytes;
use spotter_eye::{
    hsv_scale_image, CameraInfo, ColorFrame, ColorObjectLocator, DebugImages, DepthFrame, Detection, PixelOrder,
};
use spotter_node::NodeConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spotter")]
#[command(about = "Locate colored objects in registered color and depth images", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate objects in one color image and its registered depth
    Locate {
        /// Color image (any format the image crate reads)
        #[arg(long)]
        color: PathBuf,

        /// 16-bit depth image in millimetres, 0 = no reading
        #[arg(long, conflicts_with = "constant_depth")]
        depth: Option<PathBuf>,

        /// Use this depth (metres) for every pixel instead of a depth image
        #[arg(long)]
        constant_depth: Option<f32>,

        /// Camera calibration (JSON, TOML or YAML)
        #[arg(long)]
        camera: PathBuf,

        /// Node configuration file
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Override the configured search colors
        #[arg(long, value_delimiter = ',')]
        colors: Vec<String>,

        /// Write debug images into this directory
        #[arg(long)]
        debug_dir: Option<PathBuf>,
    },

    /// Print the effective mother settings
    Settings {
        /// Settings file (JSON, TOML or YAML); defaults when omitted
        #[arg(long, short)]
        file: Option<PathBuf>,

        /// Apply SPOTTER_* environment overrides
        #[arg(long)]
        env: bool,
    },

    /// Write the hue/saturation reference chart as a PNG
    HsvScale {
        #[arg(long, short, default_value = "hsv_scale.png")]
        output: PathBuf,
    },
}

#[derive(Serialize)]
struct LocateReport {
    detections: Vec<Detection>,
    candidates: Vec<PointStamped>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    match cli.command {
        Commands::Locate {
            color,
            depth,
            constant_depth,
            camera,
            config,
            colors,
            debug_dir,
        } => {
            let mut config = match config {
                Some(path) => NodeConfig::from_file(&path)
                    .with_context(|| format!("loading node config {}", path.display()))?,
                None => NodeConfig::default(),
            };
            if !colors.is_empty() {
                config.locator.search_colors = colors;
            }
            config.locator.debug = debug_dir.is_some();
            config.validate().map_err(anyhow::Error::msg)?;

            let report = locate(&config, &color, depth.as_deref(), constant_depth, &camera, debug_dir.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Settings { file, env } => {
            let mut settings = match file {
                Some(path) => MotherSettings::from_file(&path)
                    .with_context(|| format!("loading settings {}", path.display()))?,
                None => MotherSettings::default(),
            };
            if env {
                settings.apply_env(|key| std::env::var(key).ok());
            }
            settings.validate()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Commands::HsvScale { output } => {
            let chart = hsv_scale_image(PixelOrder::Rgb8)?;
            save_mat(&chart, &output)?;
            info!("Wrote HSV scale to {}", output.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn locate(
    config: &NodeConfig,
    color_path: &Path,
    depth_path: Option<&Path>,
    constant_depth: Option<f32>,
    camera_path: &Path,
    debug_dir: Option<&Path>,
) -> anyhow::Result<LocateReport> {
    let info: CameraInfo =
        read_document(camera_path).with_context(|| format!("loading calibration {}", camera_path.display()))?;
    let locator = ColorObjectLocator::with_calibration(config.locator.clone(), &info)?;

    let rgb = image::open(color_path)
        .with_context(|| format!("reading color image {}", color_path.display()))?
        .into_rgb8();
    let (width, height) = rgb.dimensions();
    let color = ColorFrame::new(width, height, PixelOrder::Rgb8, rgb.into_raw())?;

    let depth = match (depth_path, constant_depth) {
        (Some(path), _) => {
            let mm = image::open(path)
                .with_context(|| format!("reading depth image {}", path.display()))?
                .into_luma16();
            DepthFrame::from_millimetres(mm.width(), mm.height(), mm.as_raw())?
        }
        (None, Some(metres)) => DepthFrame::filled(width, height, metres)?,
        (None, None) => bail!("either --depth or --constant-depth is required"),
    };
    debug!("Loaded {}x{} color and {}x{} depth", width, height, depth.width(), depth.height());

    let output = locator.locate_with_debug(&color, &depth)?;
    if let (Some(dir), Some(images)) = (debug_dir, output.debug.as_ref()) {
        save_debug_images(images, dir)?;
    }

    let candidates = output
        .detections
        .iter()
        .map(|d| PointStamped::new(Header::new(color.stamp(), config.topics.frame_id.clone()), d.position))
        .collect();

    info!("Located {} candidate(s)", output.detections.len());
    Ok(LocateReport {
        detections: output.detections,
        candidates,
    })
}

fn save_debug_images(images: &DebugImages, dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    save_mat(&images.annotated, &dir.join("annotated.png"))?;
    save_mat(&images.mask_union, &dir.join("mask.png"))?;
    save_mat(&images.hue, &dir.join("hue.png"))?;
    info!("Wrote debug images to {}", dir.display());
    Ok(())
}

/// Save an 8-bit RGB or mono Mat as an image file
fn save_mat(mat: &Mat, path: &Path) -> anyhow::Result<()> {
    let (width, height) = (mat.cols() as u32, mat.rows() as u32);
    let bytes = mat_to_bytes(mat)?;

    match mat.channels() {
        1 => image::GrayImage::from_raw(width, height, bytes)
            .context("mono image buffer size mismatch")?
            .save(path)?,
        3 => image::RgbImage::from_raw(width, height, bytes)
            .context("color image buffer size mismatch")?
            .save(path)?,
        n => bail!("cannot save a {}-channel image", n),
    }
    debug!("Saved {}", path.display());
    Ok(())
}
