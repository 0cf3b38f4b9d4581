//! Synthetic planar point layouts.
//!
//! These helpers produce pixel-space control points directly, without
//! rendering, for exercising the field and metric stages in isolation.

use anyhow::Result;

use crate::{GridSpec, ImageSize, Iso3, PinholeCamera, Point2D, Real};

/// Fronto-parallel grid centered on the image with `pitch_px` pixel spacing.
///
/// Row-major order, `(col, row)` maps to
/// `center + ((col - (cols-1)/2) * pitch, (row - (rows-1)/2) * pitch)`.
pub fn centered_grid_pixels(grid: &GridSpec, size: ImageSize, pitch_px: Real) -> Vec<Point2D> {
    let c = size.center();
    let half_w = (grid.columns as Real - 1.0) * 0.5;
    let half_h = (grid.rows as Real - 1.0) * 0.5;
    (0..grid.len())
        .map(|i| {
            let (col, row) = grid.logical_index(i);
            Point2D::new(
                c.x + (col as Real - half_w) * pitch_px,
                c.y + (row as Real - half_h) * pitch_px,
            )
        })
        .collect()
}

/// Move every point radially away from `center` by `fraction` of its radius
/// (`fraction > 0` is pincushion, `< 0` barrel).
pub fn radial_scale(points: &[Point2D], center: Point2D, fraction: Real) -> Vec<Point2D> {
    points
        .iter()
        .map(|p| *p + (*p - center).scale(fraction))
        .collect()
}

/// Move every point perpendicular to its radial direction by `amount_px`.
///
/// Points at `center` are left in place.
pub fn tangential_shift(points: &[Point2D], center: Point2D, amount_px: Real) -> Vec<Point2D> {
    points
        .iter()
        .map(|p| match (*p - center).normalize() {
            Some(u) => *p + u.perp().scale(amount_px),
            None => *p,
        })
        .collect()
}

/// Project every grid intersection through `camera`, requiring all to be visible.
pub fn project_grid(
    camera: &PinholeCamera,
    cam_from_target: &Iso3,
    grid: &GridSpec,
) -> Result<Vec<Point2D>> {
    grid.board_points()
        .iter()
        .enumerate()
        .map(|(idx, pt)| {
            let pc = cam_from_target.transform_point(pt);
            camera
                .project_point(&pc)
                .map(Point2D::from)
                .ok_or_else(|| anyhow::anyhow!("point {idx} not projectable (z={:.6})", pc.z))
        })
        .collect()
}
