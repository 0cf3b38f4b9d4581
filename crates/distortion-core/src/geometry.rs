//! Explicit planar geometry value types.
//!
//! The measurement kernel reasons about radial and tangential displacements,
//! so points (positions) and vectors (displacements) are kept as distinct
//! types: `Point2D - Point2D = Vector2D`, `Point2D + Vector2D = Point2D`.
//! Both convert losslessly to the nalgebra aliases used by the solvers.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::{dehomogenize, Mat3, Pt2, Real, Vec2, Vec3};

/// A position in the image or on the target plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: Real,
    pub y: Real,
}

/// A displacement between two [`Point2D`]s.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: Real,
    pub y: Real,
}

impl Point2D {
    pub const ORIGIN: Point2D = Point2D { x: 0.0, y: 0.0 };

    pub const fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }

    /// Displacement from `origin` to `self`.
    pub fn vector_from(&self, origin: &Point2D) -> Vector2D {
        *self - *origin
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point2D) -> Real {
        (*self - *other).norm()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, y: 0.0 };

    pub const fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: &Vector2D) -> Real {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3D cross product of the two (planar) vectors.
    pub fn cross(&self, other: &Vector2D) -> Real {
        self.x * other.y - self.y * other.x
    }

    pub fn norm_squared(&self) -> Real {
        self.dot(self)
    }

    pub fn norm(&self) -> Real {
        self.x.hypot(self.y)
    }

    pub fn scale(&self, k: Real) -> Vector2D {
        Vector2D::new(self.x * k, self.y * k)
    }

    /// The vector rotated by +90° (`(x, y) -> (-y, x)`).
    pub fn perp(&self) -> Vector2D {
        Vector2D::new(-self.y, self.x)
    }

    /// Unit vector with the same direction, or `None` for a (near) zero vector.
    pub fn normalize(&self) -> Option<Vector2D> {
        let n = self.norm();
        if !n.is_finite() || n <= Real::EPSILON {
            return None;
        }
        Some(self.scale(1.0 / n))
    }
}

impl Sub for Point2D {
    type Output = Vector2D;

    fn sub(self, rhs: Point2D) -> Vector2D {
        Vector2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Vector2D> for Point2D {
    type Output = Point2D;

    fn add(self, rhs: Vector2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub<Vector2D> for Point2D {
    type Output = Point2D;

    fn sub(self, rhs: Vector2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Vector2D {
    type Output = Vector2D;

    fn add(self, rhs: Vector2D) -> Vector2D {
        Vector2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2D {
    type Output = Vector2D;

    fn sub(self, rhs: Vector2D) -> Vector2D {
        Vector2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<Real> for Vector2D {
    type Output = Vector2D;

    fn mul(self, k: Real) -> Vector2D {
        self.scale(k)
    }
}

impl Neg for Vector2D {
    type Output = Vector2D;

    fn neg(self) -> Vector2D {
        Vector2D::new(-self.x, -self.y)
    }
}

impl From<Pt2> for Point2D {
    fn from(p: Pt2) -> Self {
        Point2D::new(p.x, p.y)
    }
}

impl From<Point2D> for Pt2 {
    fn from(p: Point2D) -> Self {
        Pt2::new(p.x, p.y)
    }
}

impl From<Vec2> for Vector2D {
    fn from(v: Vec2) -> Self {
        Vector2D::new(v.x, v.y)
    }
}

impl From<Vector2D> for Vec2 {
    fn from(v: Vector2D) -> Self {
        Vec2::new(v.x, v.y)
    }
}

/// A 3×3 projective matrix, row-major in its serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[Real; 3]; 3]", into = "[[Real; 3]; 3]")]
pub struct Matrix3x3(Mat3);

impl Matrix3x3 {
    pub fn identity() -> Self {
        Self(Mat3::identity())
    }

    pub fn from_rows(rows: [[Real; 3]; 3]) -> Self {
        Self(Mat3::new(
            rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
            rows[2][1], rows[2][2],
        ))
    }

    pub fn rows(&self) -> [[Real; 3]; 3] {
        let m = &self.0;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }

    /// Entry at `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> Real {
        self.0[(row, col)]
    }

    pub fn as_matrix(&self) -> &Mat3 {
        &self.0
    }

    pub fn inverse(&self) -> Option<Matrix3x3> {
        self.0.try_inverse().map(Matrix3x3)
    }

    /// Copy scaled so that the bottom-right entry equals one.
    ///
    /// Matrices whose `m[2][2]` is (near) zero are returned unchanged.
    pub fn normalized(&self) -> Matrix3x3 {
        let s = self.0[(2, 2)];
        if s.abs() > Real::EPSILON {
            Matrix3x3(self.0 / s)
        } else {
            *self
        }
    }

    /// Apply the projective transform to a point.
    ///
    /// Returns `None` if the point is mapped to (or near) infinity.
    pub fn apply(&self, p: &Point2D) -> Option<Point2D> {
        let v = self.0 * Vec3::new(p.x, p.y, 1.0);
        dehomogenize(&v).map(Point2D::from)
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl Mul for Matrix3x3 {
    type Output = Matrix3x3;

    fn mul(self, rhs: Matrix3x3) -> Matrix3x3 {
        Matrix3x3(self.0 * rhs.0)
    }
}

impl From<Mat3> for Matrix3x3 {
    fn from(m: Mat3) -> Self {
        Matrix3x3(m)
    }
}

impl From<Matrix3x3> for Mat3 {
    fn from(m: Matrix3x3) -> Self {
        m.0
    }
}

impl From<[[Real; 3]; 3]> for Matrix3x3 {
    fn from(rows: [[Real; 3]; 3]) -> Self {
        Matrix3x3::from_rows(rows)
    }
}

impl From<Matrix3x3> for [[Real; 3]; 3] {
    fn from(m: Matrix3x3) -> Self {
        m.rows()
    }
}
