//! Per-point displacement field and its scalar reduction.

use serde::{Deserialize, Serialize};

use crate::{Point2D, Real, Vector2D};

/// Lens-induced displacement of one control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistortionVector {
    /// Logical `(col, row)` cell.
    pub grid_index: (usize, usize),
    pub ideal: Point2D,
    pub actual: Point2D,
    /// `actual - ideal`.
    pub delta: Vector2D,
    /// `|ideal - optical_center|`.
    pub ideal_radius: Real,
    /// Projection of `delta` onto the outward radial unit vector
    /// (zero when `ideal_radius` is degenerate).
    pub radial_component: Real,
}

/// Terminal output of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistortionReport {
    pub tv_distortion_percent: Real,
    pub max_radial_deviation: Real,
    /// `None` when no point has a usable ideal radius.
    pub worst_point_index: Option<usize>,
    pub r_max_at_worst_point: Real,
    pub field: Vec<DistortionVector>,
}

impl DistortionReport {
    /// The field entry that determined the metric, if any.
    pub fn worst_point(&self) -> Option<&DistortionVector> {
        self.worst_point_index.and_then(|i| self.field.get(i))
    }
}
