//! TV distortion measurement from a single image of a planar grid target.
//!
//! Stages, leaves first:
//!
//! 1. [`ControlPointDetector`]: chessboard intersections, sub-pixel refined,
//! 2. [`IdealProjectionEstimator`]: distortion-free positions of the same
//!    points, from a calibrated camera model or a homography fallback,
//! 3. [`DistortionFieldComputer`]: per-point displacement and its radial
//!    component about the image center,
//! 4. [`TVDistortionMetric`]: worst radial deviation relative to its radius.
//!
//! [`analyze`] chains all four and returns a [`DistortionAnalysis`].
//!
//! ```no_run
//! use distortion_core::{GrayImage, GridSpec};
//! use distortion_pipeline::{analyze, PipelineConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let image = GrayImage::filled(640, 480, 0);
//! let analysis = analyze(
//!     &image.as_view(),
//!     &GridSpec::new(9, 6, 10.0),
//!     &PipelineConfig::default(),
//! )?;
//! println!("{:.3} %", analysis.report.tv_distortion_percent);
//! # Ok(())
//! # }
//! ```

mod analysis;
mod config;
mod error;
mod estimator;
mod field;
mod metric;

pub mod report;

pub use analysis::{analyze, analyze_points, analyze_points_with, DistortionAnalysis};
pub use config::{EstimatorParams, MetricParams, PipelineConfig};
pub use error::DistortionError;
pub use estimator::{
    CalibratedModelStrategy, EstimateError, HomographyStrategy, IdealProjectionEstimator,
    ProjectionFit, ProjectionInput, ProjectionStrategy,
};
pub use field::DistortionFieldComputer;
pub use metric::TVDistortionMetric;

pub use distortion_detect::{ControlPointDetector, DetectorParams};
