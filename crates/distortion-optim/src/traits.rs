use distortion_core::Real;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Dense least-squares objective `min ½‖r(x)‖²`.
///
/// `residuals` returns `None` outside the domain of the model, for instance
/// when a candidate pose moves target points behind the camera.
pub trait NllsProblem {
    fn num_params(&self) -> usize;
    fn num_residuals(&self) -> usize;
    fn residuals(&self, x: &DVector<Real>) -> Option<DVector<Real>>;

    /// `∂r/∂x`, `num_residuals × num_params`.
    fn jacobian(&self, x: &DVector<Real>) -> Option<DMatrix<Real>> {
        central_difference_jacobian(self, x)
    }
}

/// Two-sided finite differences, step `1e-6 · max(|x_k|, 1)`.
pub fn central_difference_jacobian<P: NllsProblem + ?Sized>(
    problem: &P,
    x: &DVector<Real>,
) -> Option<DMatrix<Real>> {
    let mut jac = DMatrix::zeros(problem.num_residuals(), x.len());
    let mut shifted = x.clone();
    for k in 0..x.len() {
        let step = 1e-6 * x[k].abs().max(1.0);
        shifted[k] = x[k] + step;
        let fwd = problem.residuals(&shifted)?;
        shifted[k] = x[k] - step;
        let bwd = problem.residuals(&shifted)?;
        shifted[k] = x[k];
        jac.set_column(k, &((fwd - bwd) / (2.0 * step)));
    }
    Some(jac)
}

/// Stopping criteria shared by solver backends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Iteration budget; the LM backend turns it into an evaluation cap of
    /// `max_iters · (n + 1)`.
    pub max_iters: usize,
    pub ftol: Real,
    pub gtol: Real,
    pub xtol: Real,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            max_iters: 100,
            ftol: 1e-12,
            gtol: 1e-12,
            xtol: 1e-12,
        }
    }
}

/// Outcome of one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub iterations: usize,
    /// `½‖r‖²` at the returned parameters.
    pub final_cost: Real,
    pub converged: bool,
    /// Stopped on the evaluation cap; the parameters are the best found so far.
    pub hit_iteration_cap: bool,
    pub termination: String,
}

impl SolveReport {
    /// Converged, or stopped on the cap with a usable estimate.
    pub fn usable(&self) -> bool {
        self.converged || self.hit_iteration_cap
    }
}

pub trait NllsSolverBackend {
    /// Minimize from `x0`. Always returns the last parameters; check
    /// [`SolveReport::usable`] before trusting them.
    fn solve<P: NllsProblem>(
        &self,
        problem: &P,
        x0: DVector<Real>,
        opts: &SolveOptions,
    ) -> (DVector<Real>, SolveReport);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Quadratic;

    impl NllsProblem for Quadratic {
        fn num_params(&self) -> usize {
            2
        }

        fn num_residuals(&self) -> usize {
            2
        }

        fn residuals(&self, x: &DVector<Real>) -> Option<DVector<Real>> {
            Some(DVector::from_vec(vec![x[0] * x[0], x[0] * x[1]]))
        }
    }

    #[test]
    fn default_jacobian_matches_analytic() {
        let x = DVector::from_vec(vec![1.5, -2.0]);
        let j = Quadratic.jacobian(&x).unwrap();
        let expected = DMatrix::from_row_slice(2, 2, &[3.0, 0.0, -2.0, 1.5]);
        assert!((j - expected).abs().max() < 1e-6);
    }
}
