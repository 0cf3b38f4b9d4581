//! Numerical conditioning helpers shared by the linear solvers.

use distortion_core::{Mat3, Pt2, Real};

/// Hartley normalization for 2D points.
///
/// Centers points at the origin and scales so that the mean distance from
/// the origin is `√2`. Returns the normalized points and `T` such that
/// `p_norm = T * p_homogeneous`, or `None` for empty input or coincident points.
pub fn normalize_points_2d(points: &[Pt2]) -> Option<(Vec<Pt2>, Mat3)> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as Real;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let cx = sx / n;
    let cy = sy / n;

    let mean_dist = points
        .iter()
        .map(|p| (p.x - cx).hypot(p.y - cy))
        .sum::<Real>()
        / n;

    if !mean_dist.is_finite() || mean_dist <= Real::EPSILON {
        return None;
    }

    let scale = (2.0 as Real).sqrt() / mean_dist;
    let t = Mat3::new(
        scale,
        0.0,
        -scale * cx,
        0.0,
        scale,
        -scale * cy,
        0.0,
        0.0,
        1.0,
    );

    let norm = points
        .iter()
        .map(|p| Pt2::new((p.x - cx) * scale, (p.y - cy) * scale))
        .collect();

    Some((norm, t))
}

/// Ratio of the smallest to the largest principal spread of a point cloud.
///
/// Close to zero when the points are (nearly) collinear.
pub fn planar_spread_ratio(points: &[Pt2]) -> Real {
    if points.len() < 2 {
        return 0.0;
    }
    let n = points.len() as Real;
    let cx = points.iter().map(|p| p.x).sum::<Real>() / n;
    let cy = points.iter().map(|p| p.y).sum::<Real>() / n;
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for p in points {
        let dx = p.x - cx;
        let dy = p.y - cy;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    let tr = sxx + syy;
    if tr <= Real::EPSILON {
        return 0.0;
    }
    let disc = ((sxx - syy) * (sxx - syy) + 4.0 * sxy * sxy).sqrt();
    let l_max = 0.5 * (tr + disc);
    let l_min = (0.5 * (tr - disc)).max(0.0);
    (l_min / l_max).sqrt()
}
