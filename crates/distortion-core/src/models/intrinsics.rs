use nalgebra::{Matrix3, Point2, RealField};
use serde::{Deserialize, Serialize};

/// Pinhole intrinsics `K = [[fx, skew, cx], [0, fy, cy], [0, 0, 1]]` (pixels).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FxFyCxCySkew<S: RealField + Copy> {
    pub fx: S,
    pub fy: S,
    pub cx: S,
    pub cy: S,
    pub skew: S,
}

impl<S: RealField + Copy> FxFyCxCySkew<S> {
    /// Zero skew.
    pub fn from_focal(fx: S, fy: S, principal_point: Point2<S>) -> Self {
        Self {
            fx,
            fy,
            cx: principal_point.x,
            cy: principal_point.y,
            skew: S::zero(),
        }
    }

    pub fn principal_point(&self) -> Point2<S> {
        Point2::new(self.cx, self.cy)
    }

    pub fn k_matrix(&self) -> Matrix3<S> {
        let (o, l) = (S::zero(), S::one());
        Matrix3::from_row_slice(&[self.fx, self.skew, self.cx, o, self.fy, self.cy, o, o, l])
    }

    /// `z = 1` plane → pixels.
    pub fn to_pixel(&self, n: &Point2<S>) -> Point2<S> {
        Point2::new(
            self.fx * n.x + self.skew * n.y + self.cx,
            self.fy * n.y + self.cy,
        )
    }

    /// Pixels → `z = 1` plane.
    pub fn to_normalized(&self, px: &Point2<S>) -> Point2<S> {
        let y = (px.y - self.cy) / self.fy;
        Point2::new((px.x - self.cx - self.skew * y) / self.fx, y)
    }
}
