//! Chessboard control-point detection.
//!
//! [`ControlPointDetector::detect`] runs, on an 8-bit grayscale view:
//!
//! 1. ChESS corner detection (`chess_corners`, through `calib_targets::detect`),
//! 2. chessboard lattice assembly (`calib_targets::chessboard`),
//! 3. row-major layout of the labeled lattice ([`layout`]),
//! 4. iterative sub-pixel refinement ([`subpix`]).
//!
//! Index `i` of the result always corresponds to logical cell
//! `(i % columns, i / columns)`, starting from the corner nearest the image
//! top-left.

mod detector;
mod params;

pub mod layout;
pub mod subpix;

pub use detector::{ControlPointDetector, DetectError};
pub use params::{DetectorParams, SubPixParams};
