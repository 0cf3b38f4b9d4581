//! Core math, image and data types for geometric lens-distortion measurement.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Pt2`, `Mat3`, ...) and the explicit
//!   geometric value types [`Point2D`], [`Vector2D`] and [`Matrix3x3`],
//! - borrowed/owned single-channel images ([`GrayImageView`], [`GrayImage`]),
//! - a pinhole camera with Brown–Conrady distortion,
//! - the shared data model of the measurement kernel: [`GridSpec`],
//!   [`ControlPointSet`], [`IdealPointSet`], [`DistortionVector`],
//!   [`DistortionReport`] and [`CameraModel`],
//! - deterministic synthetic data helpers (planar grids, rendered chessboards,
//!   pixel noise).
//!
//! Camera pipeline:
//! `pixel = K ∘ distortion ∘ projection(R·X + t)`

/// Explicit 2D point / vector / 3×3 matrix value types.
pub mod geometry;
/// Single-channel raster images.
pub mod image;
/// Linear algebra type aliases and helpers.
pub mod math;
/// Camera models and distortion utilities.
pub mod models;
/// Deterministic synthetic data generation.
pub mod synthetic;
/// Grid, control point and distortion report types.
pub mod types;

pub use geometry::*;
pub use image::*;
pub use math::*;
pub use models::*;
pub use types::*;
