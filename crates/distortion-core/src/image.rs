//! Single-channel 8-bit raster images.
//!
//! - [`GrayImageView`]: borrowed, strided, read-only view (what the kernel consumes).
//! - [`GrayImage`]: owned, tightly packed buffer with RGB → luma reduction.
//!
//! Decoding from files is left to callers (the CLI uses the `image` crate).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Point2D, Real};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("image has zero size ({width}x{height})")]
    Empty { width: usize, height: usize },
    #[error("stride {stride} is smaller than width {width}")]
    BadStride { width: usize, stride: usize },
    #[error("buffer holds {got} samples, need at least {expected}")]
    BufferTooSmall { expected: usize, got: usize },
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: usize,
    pub height: usize,
}

impl ImageSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Geometric center `(width / 2, height / 2)`.
    pub fn center(&self) -> Point2D {
        Point2D::new(self.width as Real * 0.5, self.height as Real * 0.5)
    }
}

/// Borrowed 8-bit grayscale view in row-major layout.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    /// Number of samples between the starts of consecutive rows.
    pub stride: usize,
    pub data: &'a [u8],
}

impl<'a> GrayImageView<'a> {
    /// Wrap a buffer, validating its geometry.
    pub fn new(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a [u8],
    ) -> Result<Self, ImageError> {
        let view = Self {
            width,
            height,
            stride,
            data,
        };
        view.validate()?;
        Ok(view)
    }

    /// Check that the view is non-empty and that `data` covers every row.
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.width == 0 || self.height == 0 {
            return Err(ImageError::Empty {
                width: self.width,
                height: self.height,
            });
        }
        if self.stride < self.width {
            return Err(ImageError::BadStride {
                width: self.width,
                stride: self.stride,
            });
        }
        let expected = (self.height - 1) * self.stride + self.width;
        if self.data.len() < expected {
            return Err(ImageError::BufferTooSmall {
                expected,
                got: self.data.len(),
            });
        }
        Ok(())
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }
}

/// Owned, tightly packed 8-bit grayscale image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayImage {
    /// Construct from raw row-major samples (`data.len() == width * height`).
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        let img = Self {
            width,
            height,
            data,
        };
        img.as_view().validate()?;
        Ok(img)
    }

    /// Uniformly filled image.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Reduce interleaved 8-bit RGB to luma with ITU-R BT.601 weights.
    pub fn from_rgb8(width: usize, height: usize, rgb: &[u8]) -> Result<Self, ImageError> {
        let expected = width * height * 3;
        if rgb.len() < expected {
            return Err(ImageError::BufferTooSmall {
                expected,
                got: rgb.len(),
            });
        }
        let data = rgb[..expected]
            .chunks_exact(3)
            .map(|px| {
                let l = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
                l.round().clamp(0.0, 255.0) as u8
            })
            .collect();
        Self::from_raw(width, height, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        self.data[y * self.width + x] = v;
    }

    /// Borrow as a read-only view.
    pub fn as_view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &self.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_rejects_short_buffer() {
        let data = vec![0u8; 10];
        let err = GrayImageView::new(4, 3, 4, &data).unwrap_err();
        assert_eq!(
            err,
            ImageError::BufferTooSmall {
                expected: 12,
                got: 10
            }
        );
    }

    #[test]
    fn strided_view_reads_rows() {
        // 3x2 image stored with stride 4 (one padding byte per row).
        let data = vec![1, 2, 3, 0, 4, 5, 6];
        let view = GrayImageView::new(3, 2, 4, &data).unwrap();
        assert_eq!(view.row(1), &[4, 5, 6]);
        assert_eq!(view.get(2, 0), 3);
    }

    #[test]
    fn rgb_reduces_to_luma() {
        let rgb = [255, 255, 255, 255, 0, 0, 0, 255, 0, 0, 0, 255];
        let img = GrayImage::from_rgb8(2, 2, &rgb).unwrap();
        assert_eq!(img.data(), &[255, 76, 150, 29]);
    }

    #[test]
    fn center_is_half_size() {
        let c = ImageSize::new(641, 480).center();
        assert_eq!(c, Point2D::new(320.5, 240.0));
    }
}
