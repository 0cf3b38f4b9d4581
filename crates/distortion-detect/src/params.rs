use calib_targets::chessboard::GridGraphParams;
use calib_targets::ChessboardParams;
use chess_corners::ChessConfig;
use distortion_core::{GridSpec, Real};
use serde::{Deserialize, Serialize};

/// Sub-pixel corner refinement criteria.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubPixParams {
    /// Half side of the refinement window (`5` → 11×11 pixels).
    pub half_window: usize,
    pub max_iters: usize,
    /// Stop once the update is shorter than this (pixels).
    pub eps: Real,
}

impl Default for SubPixParams {
    fn default() -> Self {
        Self {
            half_window: 5,
            max_iters: 30,
            eps: 1e-3,
        }
    }
}

/// Tunables of [`crate::ControlPointDetector`].
///
/// The ChESS fields map onto `chess_corners::ChessParams`, the grid fields
/// onto `calib_targets` chessboard assembly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    /// ChESS responses below this fraction of the image maximum are ignored.
    pub threshold_rel: f32,
    pub nms_radius: u32,
    pub min_cluster_size: u32,
    /// Sample the r=10 ChESS ring instead of r=5 (large, blurry boards).
    pub use_radius10: bool,
    pub min_corner_strength: f32,
    /// Admissible spacing between neighbouring corners, in pixels.
    pub min_spacing_px: f32,
    pub max_spacing_px: f32,
    pub k_neighbors: usize,
    pub orientation_tolerance_deg: f32,
    pub subpix: SubPixParams,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            threshold_rel: 0.2,
            nms_radius: 2,
            min_cluster_size: 2,
            use_radius10: false,
            min_corner_strength: 0.0,
            min_spacing_px: 5.0,
            max_spacing_px: 120.0,
            k_neighbors: 8,
            orientation_tolerance_deg: 22.5,
            subpix: SubPixParams::default(),
        }
    }
}

impl DetectorParams {
    pub fn chess_config(&self) -> ChessConfig {
        let mut cfg = ChessConfig::single_scale();
        cfg.params.threshold_rel = self.threshold_rel;
        cfg.params.nms_radius = self.nms_radius;
        cfg.params.min_cluster_size = self.min_cluster_size;
        cfg.params.use_radius10 = self.use_radius10;
        cfg
    }

    /// Board assembly for exactly `grid.columns × grid.rows` inner corners.
    pub fn board_params(&self, grid: &GridSpec) -> ChessboardParams {
        ChessboardParams {
            min_corner_strength: self.min_corner_strength,
            min_corners: grid.len().min(16),
            expected_rows: Some(grid.rows as u32),
            expected_cols: Some(grid.columns as u32),
            ..ChessboardParams::default()
        }
    }

    pub fn grid_search(&self) -> GridGraphParams {
        GridGraphParams {
            min_spacing_pix: self.min_spacing_px,
            max_spacing_pix: self.max_spacing_px,
            k_neighbors: self.k_neighbors,
            orientation_tolerance_deg: self.orientation_tolerance_deg,
        }
    }

    /// ChESS ring radius in pixels.
    pub fn ring_radius(&self) -> usize {
        if self.use_radius10 {
            10
        } else {
            5
        }
    }
}
