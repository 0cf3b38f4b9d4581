use serde::{Deserialize, Serialize};

use crate::{BrownConrady5, FxFyCxCySkew, Iso3, Matrix3x3, PinholeCamera, Real};

/// Which projection strategy produced the ideal points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    CalibratedModel,
    Homography,
}

impl std::fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionKind::CalibratedModel => f.write_str("calibrated camera model"),
            ProjectionKind::Homography => f.write_str("planar homography"),
        }
    }
}

/// Camera model fitted to one view of the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraModel {
    /// Single-view pinhole fit. `distortion` holds the fitted lens terms;
    /// ideal points are projected with them forced to zero.
    Calibrated {
        intrinsics: FxFyCxCySkew<Real>,
        distortion: BrownConrady5<Real>,
        cam_from_target: Iso3,
    },
    /// Target plane → pixel homography.
    Homography { h: Matrix3x3 },
}

impl CameraModel {
    pub fn kind(&self) -> ProjectionKind {
        match self {
            CameraModel::Calibrated { .. } => ProjectionKind::CalibratedModel,
            CameraModel::Homography { .. } => ProjectionKind::Homography,
        }
    }

    /// The distortion-free pinhole camera of a calibrated model.
    pub fn ideal_camera(&self) -> Option<PinholeCamera> {
        match self {
            CameraModel::Calibrated {
                intrinsics,
                distortion,
                ..
            } => Some(PinholeCamera::new(*intrinsics, *distortion).without_distortion()),
            CameraModel::Homography { .. } => None,
        }
    }
}
