//! Homography estimation (plane-induced projective transform).
//!
//! The homography `H` maps **target points** on a plane to **image points**
//! in pixels: `x' ~ H x`. Normalization is applied internally and the output
//! is de-normalized and scaled so that `H[2,2] == 1` when possible.

use distortion_core::{dehomogenize, Mat3, Pt2, Real};
use nalgebra::DMatrix;
use thiserror::Error;

use crate::math::{normalize_points_2d, planar_spread_ratio};

/// Below this principal-spread ratio a point set is treated as collinear.
const MIN_SPREAD_RATIO: Real = 1e-6;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HomographyError {
    #[error("need at least 4 point correspondences, got {0}")]
    NotEnoughPoints(usize),
    #[error("correspondence count mismatch: {world} target vs {image} image points")]
    LengthMismatch { world: usize, image: usize },
    #[error("degenerate point configuration ({0})")]
    Degenerate(&'static str),
    #[error("svd failed")]
    SvdFailed,
    #[error("estimated homography is singular or not finite")]
    Singular,
}

/// Normalized DLT homography estimator.
#[derive(Debug, Clone, Copy)]
pub struct HomographySolver;

/// Estimate `H` such that `x' ~ H x` using normalized DLT.
pub fn dlt_homography(world: &[Pt2], image: &[Pt2]) -> Result<Mat3, HomographyError> {
    HomographySolver::dlt(world, image)
}

impl HomographySolver {
    /// Estimate a homography with Hartley normalization and an SVD null-space
    /// solve of the `2n × 9` design matrix.
    pub fn dlt(world: &[Pt2], image: &[Pt2]) -> Result<Mat3, HomographyError> {
        let n = world.len();
        if image.len() != n {
            return Err(HomographyError::LengthMismatch {
                world: n,
                image: image.len(),
            });
        }
        if n < 4 {
            return Err(HomographyError::NotEnoughPoints(n));
        }
        if planar_spread_ratio(world) < MIN_SPREAD_RATIO {
            return Err(HomographyError::Degenerate("collinear target points"));
        }
        if planar_spread_ratio(image) < MIN_SPREAD_RATIO {
            return Err(HomographyError::Degenerate("collinear image points"));
        }

        let (world_n, t_w) = normalize_points_2d(world)
            .ok_or(HomographyError::Degenerate("coincident target points"))?;
        let (image_n, t_i) = normalize_points_2d(image)
            .ok_or(HomographyError::Degenerate("coincident image points"))?;

        // At least 9 rows so the SVD exposes the full right null space.
        let rows = (2 * n).max(9);
        let mut a = DMatrix::<Real>::zeros(rows, 9);
        for (i, (pw, pi)) in world_n.iter().zip(image_n.iter()).enumerate() {
            let (x, y, u, v) = (pw.x, pw.y, pi.x, pi.y);
            let r0 = 2 * i;
            let r1 = r0 + 1;

            a[(r0, 0)] = -x;
            a[(r0, 1)] = -y;
            a[(r0, 2)] = -1.0;
            a[(r0, 6)] = u * x;
            a[(r0, 7)] = u * y;
            a[(r0, 8)] = u;

            a[(r1, 3)] = -x;
            a[(r1, 4)] = -y;
            a[(r1, 5)] = -1.0;
            a[(r1, 6)] = v * x;
            a[(r1, 7)] = v * y;
            a[(r1, 8)] = v;
        }

        let svd = a.svd(false, true);
        let v_t = svd.v_t.ok_or(HomographyError::SvdFailed)?;
        // Null vector: right singular vector of the smallest singular value.
        let (min_idx, _) = svd
            .singular_values
            .iter()
            .enumerate()
            .fold((0, Real::INFINITY), |best, (i, &s)| {
                if s < best.1 {
                    (i, s)
                } else {
                    best
                }
            });
        let h_vec = v_t.row(min_idx);

        let mut h_norm = Mat3::zeros();
        for r in 0..3 {
            for c in 0..3 {
                h_norm[(r, c)] = h_vec[3 * r + c];
            }
        }

        let t_i_inv = t_i.try_inverse().ok_or(HomographyError::Singular)?;
        let mut h = t_i_inv * h_norm * t_w;

        let scale = h[(2, 2)];
        if scale.abs() > Real::EPSILON {
            h /= scale;
        } else {
            h /= h.norm();
        }

        let det = h.determinant();
        if !h.iter().all(|v| v.is_finite()) || det.abs() <= 1e-12 * h.norm().powi(3) {
            return Err(HomographyError::Singular);
        }
        Ok(h)
    }
}

/// Apply `H` to every point; `None` if any point maps to infinity.
pub fn apply_homography(h: &Mat3, points: &[Pt2]) -> Option<Vec<Pt2>> {
    points
        .iter()
        .map(|p| dehomogenize(&(h * distortion_core::homogeneous(p))))
        .collect()
}

/// RMS transfer error `|H·world − image|` in image units.
pub fn homography_rms(h: &Mat3, world: &[Pt2], image: &[Pt2]) -> Option<Real> {
    if world.is_empty() || world.len() != image.len() {
        return None;
    }
    let mapped = apply_homography(h, world)?;
    let sum_sq: Real = mapped
        .iter()
        .zip(image)
        .map(|(m, i)| (m - i).norm_squared())
        .sum();
    Some((sum_sq / world.len() as Real).sqrt())
}
