//! Ideal (distortion-free) positions of the control points.
//!
//! [`IdealProjectionEstimator`] tries an ordered list of
//! [`ProjectionStrategy`] implementations and keeps the first that succeeds:
//!
//! 1. [`CalibratedModelStrategy`]: single-view pinhole + Brown–Conrady fit,
//!    ideal points re-projected with the distortion terms set to zero,
//! 2. [`HomographyStrategy`]: target → pixel homography applied to the grid.

use distortion_core::{
    BrownConrady5, CameraModel, ControlPointSet, GridSpec, IdealPointSet, ImageSize, Matrix3x3,
    PinholeCamera, Point2D, ProjectionKind, Pt2, Real,
};
use distortion_linear::{
    dlt_homography, estimate_planar_pose_from_h, HomographyError, IntrinsicsInitError, PoseError,
    SingleViewIntrinsics,
};
use distortion_optim::{
    single_view::{refine_single_view, SingleViewError, SingleViewProblem},
    LmBackend,
};
use log::{debug, info, warn};
use thiserror::Error;

use crate::{config::EstimatorParams, error::DistortionError};

/// Why a single strategy could not produce ideal points.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstimateError {
    #[error("homography: {0}")]
    Homography(#[from] HomographyError),
    #[error("intrinsics initialization: {0}")]
    Intrinsics(#[from] IntrinsicsInitError),
    #[error("pose initialization: {0}")]
    Pose(#[from] PoseError),
    #[error("camera refinement setup: {0}")]
    Problem(#[from] SingleViewError),
    #[error("camera refinement did not converge ({0})")]
    NotConverged(String),
    #[error("fitted camera has non-finite parameters")]
    NonFinite,
    #[error("target lies behind the fitted camera")]
    BehindCamera,
    #[error("reprojection rms {rms:.3} px exceeds {limit:.3} px")]
    PoorFit { rms: Real, limit: Real },
    #[error("grid point {0} has no finite ideal projection")]
    Unprojectable(usize),
}

/// Observations handed to a [`ProjectionStrategy`].
#[derive(Debug, Clone, Copy)]
pub struct ProjectionInput<'a> {
    pub control_points: &'a ControlPointSet,
    pub grid: &'a GridSpec,
    pub image_size: ImageSize,
}

impl ProjectionInput<'_> {
    fn target(&self) -> Vec<Pt2> {
        self.grid
            .target_points()
            .into_iter()
            .map(Pt2::from)
            .collect()
    }

    fn pixels(&self) -> Vec<Pt2> {
        self.control_points.iter().map(|cp| cp.pixel.into()).collect()
    }
}

/// Ideal points together with the model that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionFit {
    pub ideal: IdealPointSet,
    pub model: CameraModel,
    /// RMS distance between the fitted model and the detected points (pixels).
    pub rms_px: Real,
    /// Solver iterations, for iterative strategies.
    pub iterations: Option<usize>,
}

impl ProjectionFit {
    pub fn kind(&self) -> ProjectionKind {
        self.model.kind()
    }
}

/// One way of turning detected control points into ideal points.
pub trait ProjectionStrategy: Send + Sync {
    fn kind(&self) -> ProjectionKind;

    /// Produce one ideal point per control point, in the same order.
    fn project(&self, input: &ProjectionInput<'_>) -> Result<ProjectionFit, EstimateError>;
}

fn rms_distance(a: &[Point2D], b: &[Point2D]) -> Real {
    let sum_sq: Real = a
        .iter()
        .zip(b)
        .map(|(p, q)| (*p - *q).norm_squared())
        .sum();
    (sum_sq / a.len().max(1) as Real).sqrt()
}

/// Full single-view camera fit with the principal point at the image center.
#[derive(Debug, Clone, Default)]
pub struct CalibratedModelStrategy {
    params: EstimatorParams,
}

impl CalibratedModelStrategy {
    pub fn new(params: EstimatorParams) -> Self {
        Self { params }
    }
}

impl ProjectionStrategy for CalibratedModelStrategy {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::CalibratedModel
    }

    fn project(&self, input: &ProjectionInput<'_>) -> Result<ProjectionFit, EstimateError> {
        let target = input.target();
        let pixels = input.pixels();

        let h = dlt_homography(&target, &pixels)?;
        let init = SingleViewIntrinsics::from_homography(&h, input.image_size)?;
        let pose0 = estimate_planar_pose_from_h(&init.intrinsics.k_matrix(), &h)?;
        debug!(
            "camera init: fx={:.2} fy={:.2} ({:?})",
            init.intrinsics.fx, init.intrinsics.fy, init.source
        );

        let problem = SingleViewProblem::new(
            input.grid.board_points(),
            pixels,
            input.image_size.center().into(),
            self.params.distortion_terms(),
        )?;
        let cam0 = PinholeCamera::new(init.intrinsics, BrownConrady5::zero());
        let est = refine_single_view(&LmBackend, &problem, &cam0, &pose0, &self.params.solve);

        if !est.report.usable() {
            return Err(EstimateError::NotConverged(est.report.termination));
        }
        if est.report.hit_iteration_cap {
            warn!(
                "camera fit stopped at the iteration cap after {} evaluations; using best estimate",
                est.report.iterations
            );
        }
        let k = &est.camera.k;
        let d = &est.camera.dist;
        let finite = [k.fx, k.fy, d.k1, d.k2, d.k3, d.p1, d.p2]
            .iter()
            .all(|v| v.is_finite())
            && est.cam_from_target.translation.vector.iter().all(|v| v.is_finite())
            && est.cam_from_target.rotation.coords.iter().all(|v| v.is_finite());
        if !finite || k.fx <= 0.0 || k.fy <= 0.0 {
            return Err(EstimateError::NonFinite);
        }

        let board = input.grid.board_points();
        if board
            .iter()
            .any(|p| est.cam_from_target.transform_point(p).z <= 0.0)
        {
            return Err(EstimateError::BehindCamera);
        }
        let rms = est.rms_px.ok_or(EstimateError::BehindCamera)?;
        if rms > self.params.max_rms_px {
            return Err(EstimateError::PoorFit {
                rms,
                limit: self.params.max_rms_px,
            });
        }

        let ideal_camera = est.camera.without_distortion();
        let ideal = board
            .iter()
            .enumerate()
            .map(|(i, p)| {
                ideal_camera
                    .project_target_point(&est.cam_from_target, p)
                    .map(Point2D::from)
                    .filter(Point2D::is_finite)
                    .ok_or(EstimateError::Unprojectable(i))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProjectionFit {
            ideal: IdealPointSet(ideal),
            model: CameraModel::Calibrated {
                intrinsics: est.camera.k,
                distortion: est.camera.dist,
                cam_from_target: est.cam_from_target,
            },
            rms_px: rms,
            iterations: Some(est.report.iterations),
        })
    }
}

/// Planar homography fit; always available for non-degenerate layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomographyStrategy;

impl ProjectionStrategy for HomographyStrategy {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::Homography
    }

    fn project(&self, input: &ProjectionInput<'_>) -> Result<ProjectionFit, EstimateError> {
        let h = Matrix3x3::from(dlt_homography(&input.target(), &input.pixels())?).normalized();
        let ideal = input
            .grid
            .target_points()
            .iter()
            .enumerate()
            .map(|(i, p)| {
                h.apply(p)
                    .filter(Point2D::is_finite)
                    .ok_or(EstimateError::Unprojectable(i))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let rms_px = rms_distance(&ideal, &input.control_points.pixels());

        Ok(ProjectionFit {
            ideal: IdealPointSet(ideal),
            model: CameraModel::Homography { h },
            rms_px,
            iterations: None,
        })
    }
}

/// Runs projection strategies in order until one succeeds.
pub struct IdealProjectionEstimator {
    strategies: Vec<Box<dyn ProjectionStrategy>>,
}

impl Default for IdealProjectionEstimator {
    fn default() -> Self {
        Self::new(&EstimatorParams::default())
    }
}

impl std::fmt::Debug for IdealProjectionEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<ProjectionKind> = self.strategies.iter().map(|s| s.kind()).collect();
        f.debug_struct("IdealProjectionEstimator")
            .field("strategies", &kinds)
            .finish()
    }
}

impl IdealProjectionEstimator {
    /// Camera model first (unless disabled), homography as fallback.
    pub fn new(params: &EstimatorParams) -> Self {
        let mut strategies: Vec<Box<dyn ProjectionStrategy>> = Vec::with_capacity(2);
        if params.use_camera_model {
            strategies.push(Box::new(CalibratedModelStrategy::new(*params)));
        }
        strategies.push(Box::new(HomographyStrategy));
        Self { strategies }
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ProjectionStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> impl Iterator<Item = ProjectionKind> + '_ {
        self.strategies.iter().map(|s| s.kind())
    }

    /// Ideal points for `control_points`, index-for-index.
    pub fn estimate(
        &self,
        control_points: &ControlPointSet,
        grid: &GridSpec,
        image_size: ImageSize,
    ) -> Result<ProjectionFit, DistortionError> {
        grid.validate()
            .map_err(|e| DistortionError::InvalidInput(e.to_string()))?;
        if control_points.len() != grid.len() {
            return Err(DistortionError::InvalidInput(format!(
                "{} control points for a {}x{} grid",
                control_points.len(),
                grid.columns,
                grid.rows
            )));
        }
        if image_size.width == 0 || image_size.height == 0 {
            return Err(DistortionError::InvalidInput(format!(
                "empty image size {}x{}",
                image_size.width, image_size.height
            )));
        }

        let input = ProjectionInput {
            control_points,
            grid,
            image_size,
        };
        let mut failures = Vec::new();
        for strategy in &self.strategies {
            let kind = strategy.kind();
            match strategy.project(&input) {
                Ok(fit) if fit.ideal.len() == control_points.len() => {
                    info!(
                        "ideal points from {kind} (rms {:.3} px{})",
                        fit.rms_px,
                        fit.iterations
                            .map(|n| format!(", {n} iterations"))
                            .unwrap_or_default()
                    );
                    return Ok(fit);
                }
                Ok(fit) => {
                    warn!(
                        "{kind} returned {} ideal points for {} control points",
                        fit.ideal.len(),
                        control_points.len()
                    );
                    failures.push(format!("{kind}: wrong number of ideal points"));
                }
                Err(err) => {
                    warn!("{kind} failed: {err}");
                    failures.push(format!("{kind}: {err}"));
                }
            }
        }

        if failures.is_empty() {
            failures.push("no projection strategy configured".to_owned());
        }
        Err(DistortionError::ProjectionDegenerate(failures.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use distortion_core::synthetic::planar;

    fn control_points(grid: &GridSpec, pixels: Vec<Point2D>) -> ControlPointSet {
        ControlPointSet::from_pixels(grid, pixels).unwrap()
    }

    #[test]
    fn homography_reproduces_projective_grid() {
        let grid = GridSpec::new(4, 3, 10.0);
        let h = Matrix3x3::from_rows([
            [3.0, 0.4, 100.0],
            [-0.2, 2.8, 80.0],
            [1e-4, 2e-4, 1.0],
        ]);
        let pixels: Vec<Point2D> = grid
            .target_points()
            .iter()
            .map(|p| h.apply(p).unwrap())
            .collect();
        let cps = control_points(&grid, pixels.clone());
        let fit = HomographyStrategy
            .project(&ProjectionInput {
                control_points: &cps,
                grid: &grid,
                image_size: ImageSize::new(320, 240),
            })
            .unwrap();
        assert_eq!(fit.kind(), ProjectionKind::Homography);
        assert!(fit.rms_px < 1e-8);
        for (a, b) in fit.ideal.points().iter().zip(&pixels) {
            assert!(a.distance(b) < 1e-8);
        }
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let grid = GridSpec::new(3, 2, 1.0);
        let pixels: Vec<Point2D> = (0..6).map(|i| Point2D::new(i as Real * 5.0, 7.0)).collect();
        let cps = control_points(&grid, pixels);
        let err = IdealProjectionEstimator::default()
            .estimate(&cps, &grid, ImageSize::new(100, 100))
            .unwrap_err();
        match err {
            DistortionError::ProjectionDegenerate(msg) => {
                assert!(msg.contains("planar homography"), "{msg}");
                assert!(msg.contains("calibrated camera model"), "{msg}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn mismatched_grid_is_invalid_input() {
        let grid = GridSpec::new(4, 3, 10.0);
        let cps = control_points(
            &grid,
            planar::centered_grid_pixels(&grid, ImageSize::new(320, 240), 20.0),
        );
        let err = IdealProjectionEstimator::default()
            .estimate(&cps, &GridSpec::new(5, 3, 10.0), ImageSize::new(320, 240))
            .unwrap_err();
        assert!(matches!(err, DistortionError::InvalidInput(_)));
    }

    #[test]
    fn disabled_camera_model_leaves_only_homography() {
        let params = EstimatorParams {
            use_camera_model: false,
            ..Default::default()
        };
        let kinds: Vec<_> = IdealProjectionEstimator::new(&params).strategies().collect();
        assert_eq!(kinds, vec![ProjectionKind::Homography]);

        let kinds: Vec<_> = IdealProjectionEstimator::default().strategies().collect();
        assert_eq!(
            kinds,
            vec![ProjectionKind::CalibratedModel, ProjectionKind::Homography]
        );
    }

    #[test]
    fn empty_strategy_list_is_degenerate() {
        let grid = GridSpec::new(3, 3, 1.0);
        let cps = control_points(
            &grid,
            planar::centered_grid_pixels(&grid, ImageSize::new(100, 100), 10.0),
        );
        let err = IdealProjectionEstimator::with_strategies(Vec::new())
            .estimate(&cps, &grid, ImageSize::new(100, 100))
            .unwrap_err();
        assert!(matches!(err, DistortionError::ProjectionDegenerate(_)));
    }
}
