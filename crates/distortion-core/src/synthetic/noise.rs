//! Deterministic noise helpers for synthetic datasets.
//!
//! SplitMix64 keyed by `(seed, stream, index)`, so a sample never depends on
//! how many other samples were drawn before it.

use crate::{GrayImage, Point2D, Real, Vector2D};

/// Uniform per-axis jitter in `[-max_abs_px, +max_abs_px]` for point positions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelJitter {
    pub seed: u64,
    pub max_abs_px: Real,
}

impl PixelJitter {
    pub fn new(seed: u64, max_abs_px: Real) -> Self {
        Self { seed, max_abs_px }
    }

    /// Jitter vector for point `index`.
    pub fn sample(&self, index: usize) -> Vector2D {
        let max_abs = self.max_abs_px.abs();
        if max_abs == 0.0 {
            return Vector2D::ZERO;
        }
        let key = mix_key(self.seed, 0, index);
        let u = unit_f64(splitmix64(key));
        let v = unit_f64(splitmix64(key ^ 0x94D0_49BB_1331_11EB));
        Vector2D::new((u - 0.5) * 2.0 * max_abs, (v - 0.5) * 2.0 * max_abs)
    }

    pub fn apply(&self, points: &[Point2D]) -> Vec<Point2D> {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| *p + self.sample(i))
            .collect()
    }
}

/// Uniform additive intensity noise in `[-amplitude, +amplitude]` grey levels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntensityNoise {
    pub seed: u64,
    pub amplitude: Real,
}

impl IntensityNoise {
    pub fn new(seed: u64, amplitude: Real) -> Self {
        Self { seed, amplitude }
    }

    /// Add noise to every sample in place, saturating at `0` and `255`.
    pub fn apply(&self, image: &mut GrayImage) {
        let amp = self.amplitude.abs();
        if amp == 0.0 {
            return;
        }
        let w = image.width();
        for y in 0..image.height() {
            for x in 0..w {
                let u = unit_f64(splitmix64(mix_key(self.seed, 1, y * w + x)));
                let v = image.get(x, y) as Real + (u - 0.5) * 2.0 * amp;
                image.set(x, y, v.round().clamp(0.0, 255.0) as u8);
            }
        }
    }
}

#[inline]
fn mix_key(seed: u64, stream: u64, index: usize) -> u64 {
    seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (index as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9)
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Top 53 bits as a double in `[0, 1)`.
#[inline]
fn unit_f64(x: u64) -> Real {
    (x >> 11) as Real * (1.0 / (1u64 << 53) as Real)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_is_deterministic_and_bounded() {
        let j = PixelJitter::new(7, 0.25);
        assert_eq!(j.sample(3), j.sample(3));
        assert_ne!(j.sample(3), j.sample(4));
        for i in 0..100 {
            let s = j.sample(i);
            assert!(s.x.abs() <= 0.25 && s.y.abs() <= 0.25);
        }
    }

    #[test]
    fn zero_amplitude_is_identity() {
        let mut img = GrayImage::filled(4, 4, 128);
        IntensityNoise::new(1, 0.0).apply(&mut img);
        assert!(img.data().iter().all(|&v| v == 128));

        let pts = [Point2D::new(1.0, 2.0)];
        assert_eq!(PixelJitter::default().apply(&pts), pts.to_vec());
    }

    #[test]
    fn intensity_noise_saturates() {
        let mut img = GrayImage::filled(8, 8, 255);
        IntensityNoise::new(3, 20.0).apply(&mut img);
        assert!(img.data().iter().any(|&v| v < 255));
    }
}
