use distortion_core::{DistortionReport, DistortionVector, Real};

use crate::config::MetricParams;

/// Reduces a displacement field to the TV distortion percentage.
///
/// The worst point maximizes `|radial_component|` among points whose ideal
/// radius exceeds the epsilon. Ties go to the larger ideal radius, then to
/// the lower index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TVDistortionMetric {
    radius_epsilon: Real,
}

impl Default for TVDistortionMetric {
    fn default() -> Self {
        Self::new(&MetricParams::default())
    }
}

impl TVDistortionMetric {
    pub fn new(params: &MetricParams) -> Self {
        Self {
            radius_epsilon: params.radius_epsilon,
        }
    }

    pub fn reduce(&self, field: Vec<DistortionVector>) -> DistortionReport {
        let mut worst: Option<(usize, Real, Real)> = None;
        for (i, v) in field.iter().enumerate() {
            let valid = v.ideal_radius.is_finite()
                && v.ideal_radius > self.radius_epsilon
                && v.radial_component.is_finite();
            if !valid {
                continue;
            }
            let dev = v.radial_component.abs();
            let better = match worst {
                None => true,
                Some((_, best_dev, best_r)) => {
                    dev > best_dev || (dev == best_dev && v.ideal_radius > best_r)
                }
            };
            if better {
                worst = Some((i, dev, v.ideal_radius));
            }
        }

        let (worst_point_index, max_radial_deviation, r_max_at_worst_point) = match worst {
            Some((i, dev, r)) => (Some(i), dev, r),
            None => (None, 0.0, 0.0),
        };
        let tv_distortion_percent = if r_max_at_worst_point > 0.0 {
            100.0 * max_radial_deviation / r_max_at_worst_point
        } else {
            0.0
        };

        DistortionReport {
            tv_distortion_percent,
            max_radial_deviation,
            worst_point_index,
            r_max_at_worst_point,
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use distortion_core::{Point2D, Vector2D};

    fn vector(ideal_radius: Real, radial_component: Real) -> DistortionVector {
        DistortionVector {
            grid_index: (0, 0),
            ideal: Point2D::ORIGIN,
            actual: Point2D::ORIGIN,
            delta: Vector2D::ZERO,
            ideal_radius,
            radial_component,
        }
    }

    #[test]
    fn worst_point_is_largest_absolute_radial_deviation() {
        let report = TVDistortionMetric::default().reduce(vec![
            vector(100.0, 1.0),
            vector(200.0, -3.0),
            vector(150.0, 2.5),
        ]);
        assert_eq!(report.worst_point_index, Some(1));
        assert_eq!(report.max_radial_deviation, 3.0);
        assert_eq!(report.r_max_at_worst_point, 200.0);
        assert!((report.tv_distortion_percent - 1.5).abs() < 1e-12);
        assert_eq!(report.worst_point().unwrap().radial_component, -3.0);
    }

    #[test]
    fn centered_points_are_excluded() {
        let report =
            TVDistortionMetric::default().reduce(vec![vector(0.0, 0.0), vector(50.0, 0.5)]);
        assert_eq!(report.worst_point_index, Some(1));
        assert_eq!(report.field.len(), 2);
    }

    #[test]
    fn no_valid_points_is_zero_not_error() {
        let report = TVDistortionMetric::default().reduce(vec![vector(0.0, 0.0)]);
        assert_eq!(report.tv_distortion_percent, 0.0);
        assert_eq!(report.r_max_at_worst_point, 0.0);
        assert_eq!(report.worst_point_index, None);

        let empty = TVDistortionMetric::default().reduce(Vec::new());
        assert_eq!(empty.tv_distortion_percent, 0.0);
        assert!(empty.field.is_empty());
    }

    #[test]
    fn ties_prefer_larger_radius() {
        let report = TVDistortionMetric::default().reduce(vec![
            vector(100.0, 0.0),
            vector(300.0, 0.0),
            vector(300.0, 0.0),
        ]);
        assert_eq!(report.worst_point_index, Some(1));
        assert_eq!(report.r_max_at_worst_point, 300.0);
        assert_eq!(report.tv_distortion_percent, 0.0);
    }
}
