use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use distortion_core::{GrayImage, GridSpec};
use distortion_pipeline::{analyze, report, DistortionAnalysis, PipelineConfig};
use log::{debug, info};

/// Measure TV lens distortion from one image of a chessboard target.
#[derive(Debug, Parser)]
#[command(author, version, about = "TV distortion measurement")]
struct Args {
    /// Image of the chessboard (PNG, JPEG or BMP).
    #[arg(long)]
    image: PathBuf,

    /// Inner corners per row.
    #[arg(long, default_value_t = 9)]
    cols: usize,

    /// Inner corners per column.
    #[arg(long, default_value_t = 6)]
    rows: usize,

    /// Square size in physical units.
    #[arg(long, default_value_t = 10.0)]
    square_size: f64,

    /// Optional JSON PipelineConfig. Defaults are used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a text report to this path.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write the full distortion field as CSV to this path.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Field entries listed in the text report.
    #[arg(long, default_value_t = report::DEFAULT_REPORT_ROWS)]
    rows_in_report: usize,

    /// Skip the camera-model fit and use the homography directly.
    #[arg(long)]
    no_camera_model: bool,

    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

fn load_gray(path: &Path) -> Result<GrayImage> {
    let luma = image::open(path)
        .with_context(|| format!("failed to read image {}", path.display()))?
        .into_luma8();
    let (width, height) = luma.dimensions();
    debug!("loaded {} ({width}x{height})", path.display());
    Ok(GrayImage::from_raw(
        width as usize,
        height as usize,
        luma.into_raw(),
    )?)
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if args.no_camera_model {
        config.estimator.use_camera_model = false;
    }
    Ok(config)
}

fn run(args: &Args) -> Result<DistortionAnalysis> {
    let config = load_config(args)?;
    let grid = GridSpec::new(args.cols, args.rows, args.square_size);
    let image = load_gray(&args.image)?;
    let analysis = analyze(&image.as_view(), &grid, &config)?;

    if let Some(path) = &args.report {
        report::save_text_report(path, &analysis, args.rows_in_report)?;
        info!("text report written to {}", path.display());
    }
    if let Some(path) = &args.csv {
        report::save_csv(path, &analysis)?;
        info!("field written to {}", path.display());
    }
    Ok(analysis)
}

fn main() {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(err) = try_main(&args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main(args: &Args) -> Result<()> {
    let analysis = run(args)?;
    println!("{}", serde_json::to_string_pretty(&analysis.report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use distortion_core::{synthetic::chessboard::ChessboardScene, ImageSize};
    use std::fs;

    fn args(image: PathBuf) -> Args {
        Args::parse_from(["distortion-cli", "--image", image.to_str().unwrap()])
    }

    fn write_board(dir: &Path) -> PathBuf {
        let grid = GridSpec::new(9, 6, 10.0);
        let img = ChessboardScene::new(grid, ImageSize::new(640, 480))
            .render()
            .unwrap();
        let path = dir.join("board.png");
        image::GrayImage::from_raw(640, 480, img.into_raw())
            .unwrap()
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn defaults_match_a_nine_by_six_board() {
        let a = args(PathBuf::from("x.png"));
        assert_eq!((a.cols, a.rows), (9, 6));
        assert_eq!(a.square_size, 10.0);
        assert_eq!(a.rows_in_report, 10);
        assert!(!a.no_camera_model && !a.verbose);
    }

    #[test]
    fn analyzes_image_and_writes_reports() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(write_board(dir.path()));
        a.report = Some(dir.path().join("report.txt"));
        a.csv = Some(dir.path().join("field.csv"));
        a.rows_in_report = 4;

        let analysis = run(&a).unwrap();
        assert_eq!(analysis.report.field.len(), 54);
        assert!(analysis.report.tv_distortion_percent < 1.0);

        let text = fs::read_to_string(dir.path().join("report.txt")).unwrap();
        assert!(text.contains("Grid size: 9 x 6 inner corners"));
        assert!(text.contains("first 4 points"));
        let csv = fs::read_to_string(dir.path().join("field.csv")).unwrap();
        assert_eq!(csv.lines().count(), 55);

        let json = serde_json::to_value(&analysis.report).unwrap();
        assert!(json["tv_distortion_percent"].is_number());
    }

    #[test]
    fn config_file_and_flag_disable_camera_model() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("cfg.json");
        fs::write(&cfg, r#"{ "metric": { "radius_epsilon": 0.25 } }"#).unwrap();

        let mut a = args(PathBuf::from("unused.png"));
        a.config = Some(cfg);
        a.no_camera_model = true;
        let config = load_config(&a).unwrap();
        assert!(!config.estimator.use_camera_model);
        assert_eq!(config.metric.radius_epsilon, 0.25);
    }

    #[test]
    fn missing_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&args(dir.path().join("missing.png"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read image"));
    }

    #[test]
    fn wrong_grid_size_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(write_board(dir.path()));
        a.cols = 10;
        a.rows = 7;
        let err = run(&a).unwrap_err();
        assert!(err.to_string().starts_with("grid not found"), "{err}");
    }
}
