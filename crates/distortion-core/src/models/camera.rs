use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::{BrownConrady5, FxFyCxCySkew};
use crate::{Iso3, Pt2, Pt3, Real};

/// Pinhole camera with Brown–Conrady distortion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinholeCamera {
    pub k: FxFyCxCySkew<Real>,
    pub dist: BrownConrady5<Real>,
}

impl PinholeCamera {
    pub fn new(k: FxFyCxCySkew<Real>, dist: BrownConrady5<Real>) -> Self {
        Self { k, dist }
    }

    /// The same camera with every distortion coefficient forced to zero.
    pub fn without_distortion(&self) -> Self {
        Self {
            k: self.k,
            dist: BrownConrady5 {
                iters: self.dist.iters,
                ..BrownConrady5::zero()
            },
        }
    }

    /// Project a point given in camera coordinates.
    ///
    /// Returns `None` if the point is on or behind the image plane.
    pub fn project_point(&self, p_c: &Pt3) -> Option<Pt2> {
        if p_c.z <= Real::EPSILON {
            return None;
        }
        let n = Vector2::new(p_c.x / p_c.z, p_c.y / p_c.z);
        let d = self.dist.distort(&n);
        let px = self.k.to_pixel(&Pt2::new(d.x, d.y));
        (px.x.is_finite() && px.y.is_finite()).then_some(px)
    }

    /// Project a target-frame point through `cam_from_target`.
    pub fn project_target_point(&self, cam_from_target: &Iso3, p_t: &Pt3) -> Option<Pt2> {
        self.project_point(&cam_from_target.transform_point(p_t))
    }

    /// Map a distorted pixel to the undistorted normalized ray `(x, y, 1)`.
    pub fn backproject_normalized(&self, px: &Pt2) -> Pt2 {
        let n_d = self.k.to_normalized(px);
        let n_u = self.dist.undistort(&Vector2::new(n_d.x, n_d.y));
        Pt2::new(n_u.x, n_u.y)
    }
}
