use std::path::Path;

use anyhow::{Context, Result};
use distortion_core::Real;
use distortion_detect::DetectorParams;
use distortion_optim::{single_view::DistortionTerms, SolveOptions};
use serde::{Deserialize, Serialize};

/// Settings of the ideal-projection stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorParams {
    /// Try the calibrated camera model before the homography fallback.
    pub use_camera_model: bool,
    pub solve: SolveOptions,
    /// Fit `k3` in addition to `k1`, `k2`.
    pub fit_k3: bool,
    /// Fit the tangential terms `p1`, `p2`.
    pub fit_tangential: bool,
    /// A camera fit (converged or capped) with a larger RMS reprojection error
    /// is rejected.
    pub max_rms_px: Real,
}

impl Default for EstimatorParams {
    fn default() -> Self {
        Self {
            use_camera_model: true,
            solve: SolveOptions::default(),
            fit_k3: false,
            fit_tangential: false,
            max_rms_px: 2.0,
        }
    }
}

impl EstimatorParams {
    pub fn distortion_terms(&self) -> DistortionTerms {
        DistortionTerms {
            k3: self.fit_k3,
            tangential: self.fit_tangential,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricParams {
    /// Ideal radii at or below this (pixels) have no radial direction.
    pub radius_epsilon: Real,
}

impl Default for MetricParams {
    fn default() -> Self {
        Self {
            radius_epsilon: 1e-9,
        }
    }
}

/// All tunables of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub detector: DetectorParams,
    pub estimator: EstimatorParams,
    pub metric: MetricParams,
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid pipeline config")
    }

    /// Read a JSON config file; missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }
}
