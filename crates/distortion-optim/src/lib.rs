//! Non-linear least-squares refinement.
//!
//! - [`NllsProblem`] / [`NllsSolverBackend`]: dense problem and solver seams,
//! - [`LmBackend`]: Levenberg–Marquardt via the `levenberg-marquardt` crate,
//! - [`single_view`]: pinhole + Brown–Conrady fit to one view of a planar
//!   target with the principal point held fixed.

mod backend_lm;
mod traits;

pub mod single_view;

pub use backend_lm::LmBackend;
pub use traits::*;
