//! Linear (closed-form) initialisation for single-view planar calibration.
//!
//! - [`math::normalize_points_2d`]: Hartley conditioning,
//! - [`HomographySolver`]: normalized DLT homography `x' ~ H x`,
//! - [`SingleViewIntrinsics`]: focal lengths from one plane homography with the
//!   principal point fixed at the image center,
//! - [`PlanarPoseSolver`]: board pose `T_C_B` from `K` and `H`.
//!
//! Every estimator returns a typed error instead of panicking on degenerate
//! input.

pub mod math;

mod homography;
mod intrinsics;
mod planar_pose;

pub use homography::*;
pub use intrinsics::*;
pub use planar_pose::*;
