//! Deterministic synthetic data generation helpers.
//!
//! Building blocks for tests and demos of the measurement kernel:
//! - [`planar`]: ideal pixel grids, analytic radial/tangential displacements
//!   and projection of a [`crate::GridSpec`] through a camera,
//! - [`chessboard`]: a rasterized chessboard seen through a pinhole camera
//!   with optional Brown–Conrady distortion,
//! - [`noise`]: seeded pixel and intensity noise (no `thread_rng`).
//!
//! # Example
//!
//! ```no_run
//! use distortion_core::{synthetic::chessboard::ChessboardScene, BrownConrady5, GridSpec, ImageSize};
//!
//! let scene = ChessboardScene::new(GridSpec::new(9, 6, 10.0), ImageSize::new(640, 480))
//!     .with_distortion(BrownConrady5::radial(-0.25, 0.0));
//! let image = scene.render().unwrap();
//! let truth = scene.corner_pixels().unwrap();
//! assert_eq!(truth.len(), 54);
//! assert_eq!(image.width(), 640);
//! ```

pub mod chessboard;
pub mod noise;
pub mod planar;
