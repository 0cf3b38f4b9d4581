//! Single-view intrinsics initialisation.
//!
//! One plane homography gives two constraints on the image of the absolute
//! conic. With zero skew and the principal point fixed at the image center,
//! those two constraints determine `1/fx²` and `1/fy²`:
//!
//! ```text
//! h1ᵀ ω h2 = 0
//! h1ᵀ ω h1 = h2ᵀ ω h2          ω = diag(1/fx², 1/fy², 1)
//! ```
//!
//! Near-frontal views make the system ill-conditioned; the solver then falls
//! back to one shared focal length, and finally to a default focal of
//! `max(width, height)` pixels.

use distortion_core::{FxFyCxCySkew, ImageSize, Mat3, Pt2, Real};
use log::debug;
use thiserror::Error;

/// Relative range, in units of `max(width, height)`, accepted for a focal length.
const FOCAL_RANGE: (Real, Real) = (0.2, 20.0);
/// Largest accepted `fx / fy` (or `fy / fx`) ratio for the per-axis solution.
const MAX_ASPECT: Real = 1.5;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntrinsicsInitError {
    #[error("image size {0}x{1} is empty")]
    EmptyImage(usize, usize),
    #[error("homography is not finite or zero")]
    BadHomography,
}

/// How the focal lengths of a [`SingleViewIntrinsics`] were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocalSource {
    /// Independent `fx`, `fy` from both constraints.
    PerAxis,
    /// Least-squares single focal length.
    Shared,
    /// Constraints uninformative; `max(width, height)` assumed.
    Default,
}

/// Initial intrinsics for one view of a planar target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleViewIntrinsics {
    pub intrinsics: FxFyCxCySkew<Real>,
    pub source: FocalSource,
}

impl SingleViewIntrinsics {
    /// Estimate intrinsics from a target → pixel homography.
    pub fn from_homography(h: &Mat3, size: ImageSize) -> Result<Self, IntrinsicsInitError> {
        if size.width == 0 || size.height == 0 {
            return Err(IntrinsicsInitError::EmptyImage(size.width, size.height));
        }
        let hn = h.norm();
        if !hn.is_finite() || hn <= Real::EPSILON {
            return Err(IntrinsicsInitError::BadHomography);
        }

        let c = size.center();
        let s = size.width.max(size.height) as Real;
        let t = Mat3::new(1.0 / s, 0.0, -c.x / s, 0.0, 1.0 / s, -c.y / s, 0.0, 0.0, 1.0);
        let hp = t * h;
        let hp = hp / hp.norm();
        let (h1, h2) = (hp.column(0), hp.column(1));

        let make = |fx: Real, fy: Real, source| Self {
            intrinsics: FxFyCxCySkew::from_focal(fx * s, fy * s, Pt2::new(c.x, c.y)),
            source,
        };
        let plausible = |f: Real| f.is_finite() && f >= FOCAL_RANGE.0 && f <= FOCAL_RANGE.1;

        // [m00 m01; m10 m11] [a b]ᵀ = [r0 r1]ᵀ
        let m00 = h1[0] * h2[0];
        let m01 = h1[1] * h2[1];
        let r0 = -h1[2] * h2[2];
        let m10 = h1[0] * h1[0] - h2[0] * h2[0];
        let m11 = h1[1] * h1[1] - h2[1] * h2[1];
        let r1 = -(h1[2] * h1[2] - h2[2] * h2[2]);

        let det = m00 * m11 - m01 * m10;
        let scale = m00.hypot(m01) * m10.hypot(m11);
        if scale > 0.0 && det.abs() > 1e-3 * scale {
            let a = (r0 * m11 - m01 * r1) / det;
            let b = (m00 * r1 - r0 * m10) / det;
            if a > 0.0 && b > 0.0 {
                let (fx, fy) = (1.0 / a.sqrt(), 1.0 / b.sqrt());
                let aspect = (fx / fy).max(fy / fx);
                if plausible(fx) && plausible(fy) && aspect <= MAX_ASPECT {
                    debug!("single-view intrinsics: per-axis fx={:.2} fy={:.2}", fx * s, fy * s);
                    return Ok(make(fx, fy, FocalSource::PerAxis));
                }
            }
        }

        // Shared focal: a = b = α in both equations, least squares.
        let c1 = m00 + m01;
        let c2 = m10 + m11;
        let denom = c1 * c1 + c2 * c2;
        if denom > 1e-18 {
            let alpha = (c1 * r0 + c2 * r1) / denom;
            if alpha > 0.0 {
                let f = 1.0 / alpha.sqrt();
                if plausible(f) {
                    debug!("single-view intrinsics: shared f={:.2}", f * s);
                    return Ok(make(f, f, FocalSource::Shared));
                }
            }
        }

        debug!("single-view intrinsics: constraints uninformative, default f={s:.0}");
        Ok(make(1.0, 1.0, FocalSource::Default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Rotation3, Vector3};

    fn plane_homography(k: &FxFyCxCySkew<Real>, rot: Rotation3<Real>, t: Vector3<Real>) -> Mat3 {
        let kmtx = k.k_matrix();
        let r = rot.matrix();
        let mut h = Mat3::zeros();
        h.set_column(0, &(kmtx * r.column(0)));
        h.set_column(1, &(kmtx * r.column(1)));
        h.set_column(2, &(kmtx * t));
        h * 0.37
    }

    fn intrinsics(fx: Real, fy: Real) -> FxFyCxCySkew<Real> {
        FxFyCxCySkew {
            fx,
            fy,
            cx: 320.0,
            cy: 240.0,
            skew: 0.0,
        }
    }

    #[test]
    fn tilted_view_recovers_both_focals() {
        let k = intrinsics(800.0, 780.0);
        let h = plane_homography(
            &k,
            Rotation3::from_euler_angles(0.35, -0.3, 0.1),
            Vector3::new(-40.0, -25.0, 220.0),
        );
        let init = SingleViewIntrinsics::from_homography(&h, ImageSize::new(640, 480)).unwrap();
        assert_eq!(init.source, FocalSource::PerAxis);
        assert!((init.intrinsics.fx - 800.0).abs() < 1e-6, "{:?}", init);
        assert!((init.intrinsics.fy - 780.0).abs() < 1e-6, "{:?}", init);
        assert_eq!((init.intrinsics.cx, init.intrinsics.cy), (320.0, 240.0));
    }

    #[test]
    fn frontal_view_falls_back_to_default() {
        let k = intrinsics(800.0, 800.0);
        let h = plane_homography(&k, Rotation3::identity(), Vector3::new(-40.0, -25.0, 200.0));
        let init = SingleViewIntrinsics::from_homography(&h, ImageSize::new(640, 480)).unwrap();
        assert_eq!(init.source, FocalSource::Default);
        assert_eq!(init.intrinsics.fx, 640.0);
        assert_eq!(init.intrinsics.fy, 640.0);
    }

    #[test]
    fn rejects_zero_homography() {
        let err = SingleViewIntrinsics::from_homography(&Mat3::zeros(), ImageSize::new(10, 10));
        assert_eq!(err, Err(IntrinsicsInitError::BadHomography));
    }
}
