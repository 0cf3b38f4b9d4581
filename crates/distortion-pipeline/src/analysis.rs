use distortion_core::{
    CameraModel, ControlPointSet, DistortionReport, GrayImageView, GridSpec, ImageSize, Point2D,
    ProjectionKind, Real,
};
use distortion_detect::ControlPointDetector;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    config::PipelineConfig, error::DistortionError, estimator::IdealProjectionEstimator,
    field::DistortionFieldComputer, metric::TVDistortionMetric,
};

/// Everything a consumer needs to present one measurement: the report plus
/// the geometry it was computed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistortionAnalysis {
    pub image_size: ImageSize,
    pub optical_center: Point2D,
    pub grid: GridSpec,
    pub strategy: ProjectionKind,
    pub camera_model: CameraModel,
    /// RMS distance between the fitted model and the detected points.
    pub fit_rms_px: Real,
    /// Levenberg–Marquardt iterations when the camera model was used.
    pub solver_iterations: Option<usize>,
    pub report: DistortionReport,
}

/// Measure TV distortion from one image of a chessboard target.
pub fn analyze(
    image: &GrayImageView<'_>,
    grid: &GridSpec,
    config: &PipelineConfig,
) -> Result<DistortionAnalysis, DistortionError> {
    let control_points = ControlPointDetector::new(config.detector).detect(image, grid)?;
    debug!("detected {} control points", control_points.len());
    analyze_points(&control_points, grid, image.size(), config)
}

/// Run the projection, field and metric stages on already detected points.
pub fn analyze_points(
    control_points: &ControlPointSet,
    grid: &GridSpec,
    image_size: ImageSize,
    config: &PipelineConfig,
) -> Result<DistortionAnalysis, DistortionError> {
    analyze_points_with(
        &IdealProjectionEstimator::new(&config.estimator),
        control_points,
        grid,
        image_size,
        config,
    )
}

/// [`analyze_points`] with a caller-supplied estimator.
pub fn analyze_points_with(
    estimator: &IdealProjectionEstimator,
    control_points: &ControlPointSet,
    grid: &GridSpec,
    image_size: ImageSize,
    config: &PipelineConfig,
) -> Result<DistortionAnalysis, DistortionError> {
    let fit = estimator.estimate(control_points, grid, image_size)?;
    let field = DistortionFieldComputer::new(&config.metric).compute(
        control_points,
        &fit.ideal,
        image_size,
    )?;
    let report = TVDistortionMetric::new(&config.metric).reduce(field);
    info!(
        "TV distortion {:.3}% (max radial deviation {:.3} px at r = {:.1} px)",
        report.tv_distortion_percent, report.max_radial_deviation, report.r_max_at_worst_point
    );

    Ok(DistortionAnalysis {
        image_size,
        optical_center: image_size.center(),
        grid: *grid,
        strategy: fit.kind(),
        camera_model: fit.model,
        fit_rms_px: fit.rms_px,
        solver_iterations: fit.iterations,
        report,
    })
}
