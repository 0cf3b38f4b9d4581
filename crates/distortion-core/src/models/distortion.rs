use nalgebra::{RealField, Vector2};
use serde::{Deserialize, Serialize};

/// Brown–Conrady lens distortion on normalized image coordinates.
///
/// `x_d = x·(1 + k1 r² + k2 r⁴ + k3 r⁶) + tangential(x)`, with
/// `tangential = (2 p1 x y + p2 (r² + 2x²), p1 (r² + 2y²) + 2 p2 x y)`.
/// Negative `k1` is barrel, positive is pincushion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BrownConrady5<S: RealField> {
    pub k1: S,
    pub k2: S,
    pub k3: S,
    pub p1: S,
    pub p2: S,
    /// Iterations of the inverse mapping in [`BrownConrady5::undistort`].
    pub iters: u32,
}

impl<S: RealField + Copy> BrownConrady5<S> {
    pub fn zero() -> Self {
        Self {
            k1: S::zero(),
            k2: S::zero(),
            k3: S::zero(),
            p1: S::zero(),
            p2: S::zero(),
            iters: 8,
        }
    }

    /// Radial-only model.
    pub fn radial(k1: S, k2: S) -> Self {
        Self {
            k1,
            k2,
            ..Self::zero()
        }
    }

    pub fn is_zero(&self) -> bool {
        [self.k1, self.k2, self.k3, self.p1, self.p2]
            .iter()
            .all(|c| c.is_zero())
    }

    /// `1 + k1 r² + k2 r⁴ + k3 r⁶` for `r2 = r²`.
    fn radial_gain(&self, r2: S) -> S {
        S::one() + r2 * (self.k1 + r2 * (self.k2 + r2 * self.k3))
    }

    fn tangential(&self, n: &Vector2<S>) -> Vector2<S> {
        let two = S::one() + S::one();
        let r2 = n.norm_squared();
        let xy = n.x * n.y;
        Vector2::new(
            two * self.p1 * xy + self.p2 * (r2 + two * n.x * n.x),
            self.p1 * (r2 + two * n.y * n.y) + two * self.p2 * xy,
        )
    }

    /// Undistorted → distorted normalized coordinates.
    pub fn distort(&self, n: &Vector2<S>) -> Vector2<S> {
        n * self.radial_gain(n.norm_squared()) + self.tangential(n)
    }

    /// Distorted → undistorted, by fixed-point iteration
    /// `n ← (n_d − tangential(n)) / gain(|n|²)` starting from `n_d`.
    pub fn undistort(&self, n_d: &Vector2<S>) -> Vector2<S> {
        let mut n = *n_d;
        for _ in 0..self.iters.max(1) {
            let gain = self.radial_gain(n.norm_squared());
            if gain.is_zero() {
                break;
            }
            n = (n_d - self.tangential(&n)) / gain;
        }
        n
    }
}
