use distortion_core::Real;
use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt, TerminationReason};
use log::debug;
use nalgebra::{storage::Owned, DMatrix, DVector, Dyn};

use crate::{NllsProblem, NllsSolverBackend, SolveOptions, SolveReport};

struct LmWrapper<'a, P: NllsProblem> {
    problem: &'a P,
    params: DVector<Real>,
}

impl<'a, P: NllsProblem> LeastSquaresProblem<Real, Dyn, Dyn> for LmWrapper<'a, P> {
    type ResidualStorage = Owned<Real, Dyn>;
    type JacobianStorage = Owned<Real, Dyn, Dyn>;
    type ParameterStorage = Owned<Real, Dyn>;

    fn set_params(&mut self, x: &DVector<Real>) {
        self.params.clone_from(x);
    }

    fn params(&self) -> DVector<Real> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<Real>> {
        self.problem.residuals(&self.params)
    }

    fn jacobian(&self) -> Option<DMatrix<Real>> {
        self.problem.jacobian(&self.params)
    }
}

/// Dense Levenberg–Marquardt (MINPACK port).
#[derive(Debug, Default, Clone)]
pub struct LmBackend;

impl NllsSolverBackend for LmBackend {
    fn solve<P: NllsProblem>(
        &self,
        problem: &P,
        x0: DVector<Real>,
        opts: &SolveOptions,
    ) -> (DVector<Real>, SolveReport) {
        let lm = LevenbergMarquardt::new()
            .with_ftol(opts.ftol)
            .with_xtol(opts.xtol)
            .with_gtol(opts.gtol)
            .with_patience(opts.max_iters.max(1));

        let wrapper = LmWrapper {
            problem,
            params: x0,
        };

        let (wrapper, report) = lm.minimize(wrapper);
        // Tolerances tighter than machine precision still mean a settled fit.
        let converged = report.termination.was_successful()
            || matches!(
                report.termination,
                TerminationReason::NoImprovementPossible(_)
            );
        let hit_iteration_cap = matches!(report.termination, TerminationReason::LostPatience);
        debug!(
            "LM finished after {} evaluations: {:?}, cost {:.3e}",
            report.number_of_evaluations, report.termination, report.objective_function
        );

        (
            wrapper.params(),
            SolveReport {
                iterations: report.number_of_evaluations,
                final_cost: report.objective_function,
                converged,
                hit_iteration_cap,
                termination: format!("{:?}", report.termination),
            },
        )
    }
}
