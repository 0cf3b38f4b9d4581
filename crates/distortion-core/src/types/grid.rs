//! Logical grid layout and detected control points.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Point2D, Pt3, Real};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("grid must have at least 2x2 intersections, got {columns}x{rows}")]
    TooSmall { columns: usize, rows: usize },
    #[error("cell size must be positive and finite, got {0}")]
    BadCellSize(Real),
}

/// Logical layout of a calibration target: `columns × rows` inner
/// intersections spaced `cell_size` physical units apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub columns: usize,
    pub rows: usize,
    pub cell_size: Real,
}

impl GridSpec {
    pub fn new(columns: usize, rows: usize, cell_size: Real) -> Self {
        Self {
            columns,
            rows,
            cell_size,
        }
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.columns < 2 || self.rows < 2 {
            return Err(GridError::TooSmall {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(GridError::BadCellSize(self.cell_size));
        }
        Ok(())
    }

    /// Number of control points (`columns * rows`).
    pub fn len(&self) -> usize {
        self.columns * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Logical `(col, row)` cell of the point at row-major index `i`.
    pub fn logical_index(&self, i: usize) -> (usize, usize) {
        (i % self.columns, i / self.columns)
    }

    /// Physical target coordinates `(col·cell, row·cell)` at row-major index `i`.
    pub fn target_point(&self, i: usize) -> Point2D {
        let (c, r) = self.logical_index(i);
        Point2D::new(c as Real * self.cell_size, r as Real * self.cell_size)
    }

    /// All physical target coordinates in row-major order.
    pub fn target_points(&self) -> Vec<Point2D> {
        (0..self.len()).map(|i| self.target_point(i)).collect()
    }

    /// Target coordinates lifted onto the `Z = 0` board plane.
    pub fn board_points(&self) -> Vec<Pt3> {
        self.target_points()
            .into_iter()
            .map(|p| Pt3::new(p.x, p.y, 0.0))
            .collect()
    }
}

/// One detected grid intersection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Logical `(col, row)` cell.
    pub grid_index: (usize, usize),
    /// Sub-pixel image position.
    pub pixel: Point2D,
}

/// Exactly `columns * rows` control points in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPointSet {
    points: Vec<ControlPoint>,
}

impl ControlPointSet {
    /// Build a set from row-major pixel positions.
    ///
    /// Returns `None` unless exactly `grid.len()` positions are supplied.
    pub fn from_pixels(grid: &GridSpec, pixels: Vec<Point2D>) -> Option<Self> {
        if pixels.len() != grid.len() {
            return None;
        }
        let points = pixels
            .into_iter()
            .enumerate()
            .map(|(i, pixel)| ControlPoint {
                grid_index: grid.logical_index(i),
                pixel,
            })
            .collect();
        Some(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn pixels(&self) -> Vec<Point2D> {
        self.points.iter().map(|p| p.pixel).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlPoint> {
        self.points.iter()
    }
}

/// Distortion-free positions matching a [`ControlPointSet`] index for index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdealPointSet(pub Vec<Point2D>);

impl IdealPointSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[Point2D] {
        &self.0
    }
}
