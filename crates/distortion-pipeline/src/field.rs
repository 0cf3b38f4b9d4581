use distortion_core::{
    ControlPointSet, DistortionVector, IdealPointSet, ImageSize, Point2D, Real,
};

use crate::{config::MetricParams, error::DistortionError};

/// Per-point displacement of the detected grid from its ideal projection.
///
/// The optical center is the geometric image center, not a fitted
/// principal point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionFieldComputer {
    radius_epsilon: Real,
}

impl Default for DistortionFieldComputer {
    fn default() -> Self {
        Self::new(&MetricParams::default())
    }
}

impl DistortionFieldComputer {
    pub fn new(params: &MetricParams) -> Self {
        Self {
            radius_epsilon: params.radius_epsilon,
        }
    }

    pub fn radius_epsilon(&self) -> Real {
        self.radius_epsilon
    }

    /// One [`DistortionVector`] per control point, in the same order.
    pub fn compute(
        &self,
        control_points: &ControlPointSet,
        ideal: &IdealPointSet,
        image_size: ImageSize,
    ) -> Result<Vec<DistortionVector>, DistortionError> {
        self.compute_about(control_points, ideal, image_size.center())
    }

    /// Like [`Self::compute`] with an explicit optical center.
    pub fn compute_about(
        &self,
        control_points: &ControlPointSet,
        ideal: &IdealPointSet,
        center: Point2D,
    ) -> Result<Vec<DistortionVector>, DistortionError> {
        if control_points.len() != ideal.len() {
            return Err(DistortionError::InvalidInput(format!(
                "{} control points but {} ideal points",
                control_points.len(),
                ideal.len()
            )));
        }

        Ok(control_points
            .iter()
            .zip(ideal.points())
            .map(|(cp, &ideal)| {
                let delta = cp.pixel - ideal;
                let radial = ideal - center;
                let ideal_radius = radial.norm();
                let radial_component = if ideal_radius > self.radius_epsilon {
                    delta.dot(&radial) / ideal_radius
                } else {
                    0.0
                };
                DistortionVector {
                    grid_index: cp.grid_index,
                    ideal,
                    actual: cp.pixel,
                    delta,
                    ideal_radius,
                    radial_component,
                }
            })
            .collect())
    }
}
