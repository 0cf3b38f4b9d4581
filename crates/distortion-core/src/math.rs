//! Scalar and linear-algebra aliases used across the workspace.

use nalgebra::{Isometry3, Matrix3, Point2, Point3, Vector2, Vector3};

pub type Real = f64;

pub type Vec2 = Vector2<Real>;
pub type Vec3 = Vector3<Real>;
pub type Pt2 = Point2<Real>;
pub type Pt3 = Point3<Real>;
pub type Mat3 = Matrix3<Real>;
/// Rigid transform, e.g. `cam_from_target`.
pub type Iso3 = Isometry3<Real>;

/// `(x, y)` → `(x, y, 1)`.
pub fn homogeneous(p: &Pt2) -> Vec3 {
    p.to_homogeneous()
}

/// `(x, y, w)` → `(x / w, y / w)`, or `None` for points at infinity and
/// non-finite input.
pub fn dehomogenize(v: &Vec3) -> Option<Pt2> {
    if v.z.abs() <= 1e-12 || v.iter().any(|c| !c.is_finite()) {
        return None;
    }
    Some(Pt2::new(v.x / v.z, v.y / v.z))
}
