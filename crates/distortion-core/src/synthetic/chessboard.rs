//! Rasterized chessboard targets.
//!
//! A [`ChessboardScene`] places a board with `columns × rows` inner corners
//! (so `(columns + 1) × (rows + 1)` squares) in front of a pinhole camera and
//! renders it by back-projecting supersampled pixel positions onto the board
//! plane. Everything outside the board is the light background.

use anyhow::{ensure, Result};
use nalgebra::{Translation3, UnitQuaternion, Vector3};

use super::planar::project_grid;
use crate::{
    BrownConrady5, FxFyCxCySkew, GrayImage, GridSpec, ImageSize, Iso3, PinholeCamera, Point2D,
    Pt2, Real,
};

#[derive(Debug, Clone)]
pub struct ChessboardScene {
    pub grid: GridSpec,
    pub image_size: ImageSize,
    pub camera: PinholeCamera,
    pub cam_from_target: Iso3,
    /// Sub-samples per pixel side.
    pub supersample: usize,
    pub dark: u8,
    pub light: u8,
}

impl ChessboardScene {
    /// Fronto-parallel board centered in the image, one cell ≈ 40 px.
    pub fn new(grid: GridSpec, image_size: ImageSize) -> Self {
        let center = image_size.center();
        let f = 800.0;
        let k = FxFyCxCySkew {
            fx: f,
            fy: f,
            cx: center.x,
            cy: center.y,
            skew: 0.0,
        };
        let mut scene = Self {
            grid,
            image_size,
            camera: PinholeCamera::new(k, BrownConrady5::zero()),
            cam_from_target: Iso3::identity(),
            supersample: 3,
            dark: 30,
            light: 220,
        };
        scene.cam_from_target = scene.pose(40.0, 0.0, 0.0, 0.0);
        scene
    }

    /// Tilt the board about its own center (radians, XYZ Euler).
    pub fn with_tilt(mut self, roll: Real, pitch: Real, yaw: Real) -> Self {
        self.cam_from_target = self.pose(self.pitch_px(), roll, pitch, yaw);
        self
    }

    pub fn with_distortion(mut self, dist: BrownConrady5<Real>) -> Self {
        self.camera.dist = BrownConrady5 { iters: 30, ..dist };
        self
    }

    pub fn with_supersample(mut self, n: usize) -> Self {
        self.supersample = n.max(1);
        self
    }

    /// Approximate cell size in pixels at the board center.
    fn pitch_px(&self) -> Real {
        let z = self.cam_from_target.translation.vector.z;
        if z > 0.0 {
            self.camera.k.fx * self.grid.cell_size / z
        } else {
            40.0
        }
    }

    fn pose(&self, pitch_px: Real, roll: Real, pitch: Real, yaw: Real) -> Iso3 {
        let s = self.grid.cell_size;
        let z = self.camera.k.fx * s / pitch_px;
        let board_center = Vector3::new(
            (self.grid.columns as Real - 1.0) * s * 0.5,
            (self.grid.rows as Real - 1.0) * s * 0.5,
            0.0,
        );
        Iso3::from_parts(Translation3::new(0.0, 0.0, z), UnitQuaternion::identity())
            * Iso3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_euler_angles(roll, pitch, yaw),
            )
            * Iso3::from_parts(
                Translation3::from(-board_center),
                UnitQuaternion::identity(),
            )
    }

    /// True (distorted) pixel positions of the inner corners, row-major.
    pub fn corner_pixels(&self) -> Result<Vec<Point2D>> {
        project_grid(&self.camera, &self.cam_from_target, &self.grid)
    }

    /// Intensity of the board (or background) at target coordinates.
    fn shade(&self, x: Real, y: Real) -> Real {
        let s = self.grid.cell_size;
        let cx = (x / s).floor() as i64;
        let cy = (y / s).floor() as i64;
        let inside = cx >= -1
            && cy >= -1
            && cx < self.grid.columns as i64
            && cy < self.grid.rows as i64;
        if inside && (cx + cy).rem_euclid(2) == 0 {
            self.dark as Real
        } else {
            self.light as Real
        }
    }

    /// Intersect the viewing ray of pixel `px` with the board plane.
    fn target_at(&self, px: Pt2, plane_normal: &Vector3<Real>, plane_d: Real) -> Option<(Real, Real)> {
        let n = self.camera.backproject_normalized(&px);
        let ray = Vector3::new(n.x, n.y, 1.0);
        let denom = plane_normal.dot(&ray);
        if denom.abs() < 1e-12 {
            return None;
        }
        let lambda = plane_d / denom;
        if lambda <= 0.0 {
            return None;
        }
        let p_c = nalgebra::Point3::from(ray * lambda);
        let p_t = self.cam_from_target.inverse_transform_point(&p_c);
        Some((p_t.x, p_t.y))
    }

    /// Render the scene into an 8-bit grayscale image.
    pub fn render(&self) -> Result<GrayImage> {
        let ImageSize { width, height } = self.image_size;
        ensure!(width > 0 && height > 0, "empty image size {width}x{height}");
        self.grid.validate()?;

        let plane_normal = self.cam_from_target.rotation * Vector3::z();
        let plane_d = plane_normal.dot(&self.cam_from_target.translation.vector);

        let n = self.supersample.max(1);
        let inv = 1.0 / n as Real;
        let mut img = GrayImage::filled(width, height, self.light);
        for y in 0..height {
            for x in 0..width {
                let mut acc = 0.0;
                for sy in 0..n {
                    for sx in 0..n {
                        // Pixel centers sit on integer coordinates.
                        let px = Pt2::new(
                            x as Real - 0.5 + (sx as Real + 0.5) * inv,
                            y as Real - 0.5 + (sy as Real + 0.5) * inv,
                        );
                        acc += match self.target_at(px, &plane_normal, plane_d) {
                            Some((tx, ty)) => self.shade(tx, ty),
                            None => self.light as Real,
                        };
                    }
                }
                let v = acc * inv * inv;
                img.set(x, y, v.round().clamp(0.0, 255.0) as u8);
            }
        }
        Ok(img)
    }
}
