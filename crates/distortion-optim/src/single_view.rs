//! Single-view planar camera refinement.
//!
//! Parameter vector (principal point held fixed):
//!
//! ```text
//! [fx, fy, rx, ry, rz, tx, ty, tz, k1, k2, (k3), (p1, p2)]
//! ```
//!
//! `(rx, ry, rz)` is the axis-angle rotation of `T_C_B`. Residuals are
//! `observed − projected` in pixels, two rows per point.

use distortion_core::{
    BrownConrady5, FxFyCxCySkew, Iso3, PinholeCamera, Pt2, Pt3, Real,
};
use log::debug;
use nalgebra::{DVector, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{NllsProblem, NllsSolverBackend, SolveOptions, SolveReport};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SingleViewError {
    #[error("3D / 2D point counts differ ({points_3d} vs {points_2d})")]
    LengthMismatch { points_3d: usize, points_2d: usize },
    #[error("need at least {needed} points for {params} parameters, got {got}")]
    TooFewPoints {
        got: usize,
        needed: usize,
        params: usize,
    },
}

/// Which distortion terms are free in the fit. `k1` and `k2` always are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DistortionTerms {
    pub k3: bool,
    pub tangential: bool,
}

impl DistortionTerms {
    pub fn num_params(&self) -> usize {
        2 + usize::from(self.k3) + if self.tangential { 2 } else { 0 }
    }
}

/// Observations of one planar target (`z = 0`) in one image.
#[derive(Debug, Clone)]
pub struct SingleViewProblem {
    points_3d: Vec<Pt3>,
    points_2d: Vec<Pt2>,
    cx: Real,
    cy: Real,
    terms: DistortionTerms,
}

impl SingleViewProblem {
    pub fn new(
        points_3d: Vec<Pt3>,
        points_2d: Vec<Pt2>,
        principal_point: Pt2,
        terms: DistortionTerms,
    ) -> Result<Self, SingleViewError> {
        if points_3d.len() != points_2d.len() {
            return Err(SingleViewError::LengthMismatch {
                points_3d: points_3d.len(),
                points_2d: points_2d.len(),
            });
        }
        let params = 8 + terms.num_params();
        // Two residual rows per point; demand a strictly overdetermined system.
        let needed = params / 2 + 1;
        if points_3d.len() < needed {
            return Err(SingleViewError::TooFewPoints {
                got: points_3d.len(),
                needed,
                params,
            });
        }
        Ok(Self {
            points_3d,
            points_2d,
            cx: principal_point.x,
            cy: principal_point.y,
            terms,
        })
    }

    pub fn len(&self) -> usize {
        self.points_3d.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points_3d.is_empty()
    }

    pub fn terms(&self) -> DistortionTerms {
        self.terms
    }

    /// Pack an initial camera and pose into a parameter vector.
    pub fn pack(&self, camera: &PinholeCamera, cam_from_target: &Iso3) -> DVector<Real> {
        let mut x = Vec::with_capacity(self.num_params());
        x.extend_from_slice(&[camera.k.fx, camera.k.fy]);
        let w = cam_from_target.rotation.scaled_axis();
        let t = cam_from_target.translation.vector;
        x.extend_from_slice(&[w.x, w.y, w.z, t.x, t.y, t.z]);
        x.extend_from_slice(&[camera.dist.k1, camera.dist.k2]);
        if self.terms.k3 {
            x.push(camera.dist.k3);
        }
        if self.terms.tangential {
            x.extend_from_slice(&[camera.dist.p1, camera.dist.p2]);
        }
        DVector::from_vec(x)
    }

    /// Decode a parameter vector into camera and pose.
    pub fn unpack(&self, x: &DVector<Real>) -> (PinholeCamera, Iso3) {
        let k = FxFyCxCySkew {
            fx: x[0],
            fy: x[1],
            cx: self.cx,
            cy: self.cy,
            skew: 0.0,
        };
        let rot = UnitQuaternion::from_scaled_axis(Vector3::new(x[2], x[3], x[4]));
        let pose = Iso3::from_parts(Translation3::new(x[5], x[6], x[7]), rot);

        let mut dist = BrownConrady5 {
            k1: x[8],
            k2: x[9],
            ..BrownConrady5::zero()
        };
        let mut idx = 10;
        if self.terms.k3 {
            dist.k3 = x[idx];
            idx += 1;
        }
        if self.terms.tangential {
            dist.p1 = x[idx];
            dist.p2 = x[idx + 1];
        }
        (PinholeCamera::new(k, dist), pose)
    }

    /// RMS reprojection error in pixels, `None` if a point is not projectable.
    pub fn rms(&self, camera: &PinholeCamera, cam_from_target: &Iso3) -> Option<Real> {
        let sum_sq = self
            .points_3d
            .iter()
            .zip(&self.points_2d)
            .map(|(pw, meas)| {
                camera
                    .project_target_point(cam_from_target, pw)
                    .map(|p| (meas - p).norm_squared())
            })
            .sum::<Option<Real>>()?;
        Some((sum_sq / self.len().max(1) as Real).sqrt())
    }
}

impl NllsProblem for SingleViewProblem {
    fn num_params(&self) -> usize {
        8 + self.terms.num_params()
    }

    fn num_residuals(&self) -> usize {
        2 * self.points_3d.len()
    }

    fn residuals(&self, x: &DVector<Real>) -> Option<DVector<Real>> {
        if x[0] <= 0.0 || x[1] <= 0.0 {
            return None;
        }
        let (camera, pose) = self.unpack(x);
        let mut r = DVector::zeros(self.num_residuals());
        for (j, (pw, meas)) in self.points_3d.iter().zip(&self.points_2d).enumerate() {
            let proj = camera.project_target_point(&pose, pw)?;
            r[2 * j] = meas.x - proj.x;
            r[2 * j + 1] = meas.y - proj.y;
        }
        Some(r)
    }
}

/// Refined single-view model.
#[derive(Debug, Clone)]
pub struct SingleViewEstimate {
    pub camera: PinholeCamera,
    pub cam_from_target: Iso3,
    /// RMS reprojection error at the solution (pixels); `None` if not projectable.
    pub rms_px: Option<Real>,
    pub report: SolveReport,
}

/// Refine camera intrinsics, distortion and the target pose of one view.
pub fn refine_single_view<B: NllsSolverBackend>(
    backend: &B,
    problem: &SingleViewProblem,
    init_camera: &PinholeCamera,
    init_pose: &Iso3,
    opts: &SolveOptions,
) -> SingleViewEstimate {
    let x0 = problem.pack(init_camera, init_pose);
    let (x_opt, report) = backend.solve(problem, x0, opts);
    let (camera, cam_from_target) = problem.unpack(&x_opt);
    let rms_px = problem.rms(&camera, &cam_from_target);
    debug!(
        "single-view refine: fx={:.2} fy={:.2} k1={:.4} rms={:?} converged={}",
        camera.k.fx, camera.k.fy, camera.dist.k1, rms_px, report.converged
    );
    SingleViewEstimate {
        camera,
        cam_from_target,
        rms_px,
        report,
    }
}
