//! Planar pose estimation from a homography.
//!
//! Decomposes a plane-induced homography into a pose `T_C_B` given intrinsics
//! `K`, assuming the board lies on `Z = 0` in its own coordinates.

use distortion_core::{Iso3, Mat3, Real};
use nalgebra::{Matrix3, Rotation3, Translation3, UnitQuaternion, Vector3};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PoseError {
    #[error("intrinsics matrix is not invertible")]
    SingularIntrinsics,
    #[error("degenerate homography for planar pose extraction")]
    DegenerateHomography,
    #[error("svd failed during planar pose extraction")]
    SvdFailed,
}

/// Linear pose initialisation from a homography and intrinsics.
#[derive(Debug, Clone, Copy)]
pub struct PlanarPoseSolver;

/// Estimate the pose of a planar board (Z = 0) relative to the camera.
///
/// Returns an `Iso3` mapping board coordinates into camera coordinates, with
/// the board in front of the camera (`t.z > 0`).
pub fn estimate_planar_pose_from_h(kmtx: &Mat3, hmtx: &Mat3) -> Result<Iso3, PoseError> {
    PlanarPoseSolver::from_homography(kmtx, hmtx)
}

impl PlanarPoseSolver {
    /// Decompose `H ~ K [r1 r2 t]`.
    ///
    /// The rotation is projected onto SO(3); the translation is scaled so
    /// that the first two rotation columns have (on average) unit norm.
    pub fn from_homography(kmtx: &Mat3, hmtx: &Mat3) -> Result<Iso3, PoseError> {
        let k_inv = kmtx.try_inverse().ok_or(PoseError::SingularIntrinsics)?;

        let k_inv_h1 = k_inv * hmtx.column(0);
        let k_inv_h2 = k_inv * hmtx.column(1);
        let k_inv_h3 = k_inv * hmtx.column(2);

        let norm1 = k_inv_h1.norm();
        let norm2 = k_inv_h2.norm();
        if !(norm1.is_finite() && norm2.is_finite()) || norm1 <= 1e-12 || norm2 <= 1e-12 {
            return Err(PoseError::DegenerateHomography);
        }
        let mut lambda = 2.0 / (norm1 + norm2);
        // H is defined up to sign; keep the board in front of the camera.
        if k_inv_h3.z * lambda < 0.0 {
            lambda = -lambda;
        }

        let r1 = k_inv_h1 * lambda;
        let r2 = k_inv_h2 * lambda;
        let t_vec: Vector3<Real> = k_inv_h3 * lambda;
        let r3 = r1.cross(&r2);
        if r3.norm() <= 1e-12 {
            return Err(PoseError::DegenerateHomography);
        }

        let mut r_mat = Matrix3::<Real>::zeros();
        r_mat.set_column(0, &r1);
        r_mat.set_column(1, &r2);
        r_mat.set_column(2, &r3);

        // Closest rotation (polar decomposition via SVD).
        let svd = r_mat.svd(true, true);
        let mut u = svd.u.ok_or(PoseError::SvdFailed)?;
        let v_t = svd.v_t.ok_or(PoseError::SvdFailed)?;
        if (u * v_t).determinant() < 0.0 {
            u.column_mut(2).neg_mut();
        }
        let r_orth = u * v_t;

        let rot = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(r_orth));
        Ok(Iso3::from_parts(Translation3::from(t_vec), rot))
    }
}
