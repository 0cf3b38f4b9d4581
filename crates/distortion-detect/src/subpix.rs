//! Iterative sub-pixel saddle refinement.
//!
//! At the true corner `q`, every image gradient `g(p)` in the neighbourhood
//! is orthogonal to `p − q` (gradients vanish in flat regions and are normal
//! to edges that pass through `q`). Minimizing `Σ w (gᵀ(p − q))²` gives the
//! normal equations
//!
//! ```text
//! (Σ w g gᵀ) q = Σ w g gᵀ p
//! ```
//!
//! which are re-solved on a window re-centered at each new estimate.

use distortion_core::{Pt2, Real};
use image::{GrayImage, ImageBuffer, Luma};
use nalgebra::{Matrix2, Vector2};

use crate::params::SubPixParams;

/// Scharr gradients of an 8-bit image, sampled bilinearly.
pub struct GradientField {
    gx: ImageBuffer<Luma<i16>, Vec<i16>>,
    gy: ImageBuffer<Luma<i16>, Vec<i16>>,
}

impl GradientField {
    pub fn new(gray: &GrayImage) -> Self {
        Self {
            gx: imageproc::gradients::horizontal_scharr(gray),
            gy: imageproc::gradients::vertical_scharr(gray),
        }
    }

    /// `(gx, gy)` at a sub-pixel position; pixel centers on integers,
    /// borders clamped.
    pub fn at(&self, x: Real, y: Real) -> Vector2<Real> {
        Vector2::new(bilinear(&self.gx, x, y), bilinear(&self.gy, x, y))
    }
}

fn bilinear(img: &ImageBuffer<Luma<i16>, Vec<i16>>, x: Real, y: Real) -> Real {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return 0.0;
    }
    let xc = x.clamp(0.0, (w - 1) as Real);
    let yc = y.clamp(0.0, (h - 1) as Real);
    let (x0, y0) = (xc.floor() as u32, yc.floor() as u32);
    let (x1, y1) = ((x0 + 1).min(w - 1), (y0 + 1).min(h - 1));
    let (fx, fy) = (xc - x0 as Real, yc - y0 as Real);
    let px = |x: u32, y: u32| img.get_pixel(x, y)[0] as Real;
    let top = px(x0, y0) * (1.0 - fx) + px(x1, y0) * fx;
    let bottom = px(x0, y1) * (1.0 - fx) + px(x1, y1) * fx;
    top * (1.0 - fy) + bottom * fy
}

/// Refine one corner; returns the start point if refinement drifts away.
pub fn refine_corner(grad: &GradientField, start: Pt2, params: &SubPixParams) -> Pt2 {
    let hw = params.half_window.max(1) as i32;
    let hw_f = hw as Real;
    let mut q = start;

    for _ in 0..params.max_iters.max(1) {
        let mut a = Matrix2::<Real>::zeros();
        let mut b = Vector2::<Real>::zeros();
        for dy in -hw..=hw {
            for dx in -hw..=hw {
                let (fx, fy) = (dx as Real, dy as Real);
                let w = (-(fx * fx + fy * fy) / (hw_f * hw_f)).exp();
                let p = Vector2::new(q.x + fx, q.y + fy);
                let g = grad.at(p.x, p.y);
                let ggt = g * g.transpose() * w;
                a += ggt;
                b += ggt * p;
            }
        }
        let Some(next) = a.try_inverse().map(|inv| inv * b) else {
            break;
        };
        if !(next.x.is_finite() && next.y.is_finite()) {
            break;
        }
        let shift = (next - q.coords).norm();
        q = Pt2::from(next);
        if shift < params.eps {
            break;
        }
    }

    if (q - start).norm() > hw_f {
        start
    } else {
        q
    }
}

/// Refine every corner in place.
pub fn refine_corners(grad: &GradientField, corners: &mut [Pt2], params: &SubPixParams) {
    for c in corners.iter_mut() {
        *c = refine_corner(grad, *c, params);
    }
}
