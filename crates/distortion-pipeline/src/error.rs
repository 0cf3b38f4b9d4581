use distortion_detect::DetectError;
use thiserror::Error;

/// Terminal outcome of a failed analysis run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DistortionError {
    /// Control-point detection could not complete the grid.
    #[error("grid not found: {found} corner candidates for {expected} control points")]
    GridNotFound { found: usize, expected: usize },
    /// Neither projection strategy produced ideal points.
    #[error("ideal projection is degenerate: {0}")]
    ProjectionDegenerate(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<DetectError> for DistortionError {
    fn from(err: DetectError) -> Self {
        match err {
            DetectError::GridNotFound { found, expected } => {
                DistortionError::GridNotFound { found, expected }
            }
            other => DistortionError::InvalidInput(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use distortion_core::{GridError, ImageError};

    #[test]
    fn detect_errors_map_to_kernel_outcomes() {
        let e: DistortionError = DetectError::GridNotFound {
            found: 3,
            expected: 54,
        }
        .into();
        assert_eq!(
            e,
            DistortionError::GridNotFound {
                found: 3,
                expected: 54
            }
        );

        let e: DistortionError = DetectError::Grid(GridError::TooSmall {
            columns: 1,
            rows: 6,
        })
        .into();
        assert!(matches!(e, DistortionError::InvalidInput(_)));

        let e: DistortionError = DetectError::Image(ImageError::Empty {
            width: 0,
            height: 4,
        })
        .into();
        assert!(e.to_string().starts_with("invalid input"));
    }
}
