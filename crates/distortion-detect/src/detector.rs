use calib_targets::chessboard::ChessboardDetector;
use calib_targets::detect;
use calib_targets::ChessboardParams;
use distortion_core::{
    ControlPointSet, GrayImageView, GridError, GridSpec, ImageError, Point2D, Pt2, Real,
};
use log::debug;
use thiserror::Error;

use crate::layout::{row_major, LatticeCorner};
use crate::params::DetectorParams;
use crate::subpix::{refine_corners, GradientField};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DetectError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("image {width}x{height} is too small for corner detection")]
    ImageTooSmall { width: usize, height: usize },
    /// The largest chessboard lattice in the image had `found` corners and
    /// could not be matched to the requested grid.
    #[error("grid not found: {found} board corners for {expected} control points")]
    GridNotFound { found: usize, expected: usize },
}

/// Locates the inner intersections of a chessboard target.
#[derive(Debug, Clone, Default)]
pub struct ControlPointDetector {
    params: DetectorParams,
}

impl ControlPointDetector {
    pub fn new(params: DetectorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Detect exactly `grid.columns × grid.rows` control points, row-major.
    ///
    /// Nothing partial is returned: if the grid cannot be completed the
    /// result is [`DetectError::GridNotFound`].
    pub fn detect(
        &self,
        image: &GrayImageView<'_>,
        grid: &GridSpec,
    ) -> Result<ControlPointSet, DetectError> {
        image.validate()?;
        grid.validate()?;
        let p = &self.params;
        let expected = grid.len();

        let min_side = 4 * p.ring_radius() + 1;
        if image.width < min_side || image.height < min_side {
            return Err(DetectError::ImageTooSmall {
                width: image.width,
                height: image.height,
            });
        }

        let gray = to_luma8(image)?;
        let corners = detect::detect_corners(&gray, &p.chess_config());
        debug!("ChESS corners: {}", corners.len());

        let detector =
            ChessboardDetector::new(p.board_params(grid)).with_grid_search(p.grid_search());
        let Some(board) = detector.detect_from_corners(&corners) else {
            let found = self.largest_lattice(&corners);
            debug!(
                "no {}x{} board; largest lattice has {found} corners",
                grid.columns, grid.rows
            );
            return Err(DetectError::GridNotFound { found, expected });
        };

        let labeled: Vec<LatticeCorner> = board
            .detection
            .corners
            .iter()
            .filter_map(|c| {
                let g = c.grid.as_ref()?;
                Some(LatticeCorner {
                    i: g.i as i32,
                    j: g.j as i32,
                    pixel: Pt2::new(c.position.x as Real, c.position.y as Real),
                })
            })
            .collect();
        debug!("board corners with grid labels: {}", labeled.len());

        let mut pixels =
            row_major(&labeled, grid.columns, grid.rows).ok_or(DetectError::GridNotFound {
                found: labeled.len(),
                expected,
            })?;

        let gradients = GradientField::new(&gray);
        refine_corners(&gradients, &mut pixels, &p.subpix);

        let pixels = pixels.into_iter().map(Point2D::from).collect();
        ControlPointSet::from_pixels(grid, pixels).ok_or(DetectError::GridNotFound {
            found: labeled.len(),
            expected,
        })
    }

    /// Corner count of the largest board lattice regardless of its shape.
    fn largest_lattice(&self, corners: &[calib_targets::core::Corner]) -> usize {
        let params = ChessboardParams {
            min_corner_strength: self.params.min_corner_strength,
            expected_rows: None,
            expected_cols: None,
            ..ChessboardParams::default()
        };
        ChessboardDetector::new(params)
            .with_grid_search(self.params.grid_search())
            .detect_from_corners(corners)
            .map_or(0, |board| {
                board
                    .detection
                    .corners
                    .iter()
                    .filter(|c| c.grid.is_some())
                    .count()
            })
    }
}

/// Tightly packed copy of a (possibly strided) view.
fn to_luma8(view: &GrayImageView<'_>) -> Result<image::GrayImage, ImageError> {
    let mut buf = Vec::with_capacity(view.width * view.height);
    for y in 0..view.height {
        buf.extend_from_slice(view.row(y));
    }
    let got = buf.len();
    image::GrayImage::from_raw(view.width as u32, view.height as u32, buf).ok_or(
        ImageError::BufferTooSmall {
            expected: view.width * view.height,
            got,
        },
    )
}
