//! Coherent-noise density field.
//!
//! The field drives everything downstream: the adaptive grid sizes its cells
//! from it and the packer uses it as a placement-acceptance threshold, so
//! dense regions of the field become dense regions of the board.
//!
//! The generator is classic permutation-table gradient noise summed over a
//! configurable number of fractal octaves, followed by min-max normalization
//! and an optional radial vignette that biases density toward the board
//! center. Generation is pure and fully determined by the seed.

use log::warn;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::config::NoiseConfig;

/// Spread below which a field is considered flat and replaced by a uniform
/// 0.5 density.
const FLAT_EPSILON: f32 = 1e-6;

/// Seeded 2D gradient noise.
///
/// A permutation table shuffled by a seeded ChaCha stream hashes lattice
/// corners to one of eight gradient directions; samples are the fade-curve
/// interpolation of the corner dot products. Output lies roughly in [-1, 1]
/// and is rescaled by the caller, so the exact amplitude does not matter.
struct Perlin {
    perm: [u8; 256],
}

impl Perlin {
    fn new(seed: u64) -> Self {
        let mut perm = [0u8; 256];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = i as u8;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        perm.shuffle(&mut rng);
        Self { perm }
    }

    fn corner_hash(&self, x: i32, y: i32) -> u8 {
        let a = self.perm[(x & 255) as usize] as usize;
        self.perm[(a + (y & 255) as usize) & 255]
    }

    fn gradient(hash: u8, dx: f32, dy: f32) -> f32 {
        match hash & 7 {
            0 => dx + dy,
            1 => dx - dy,
            2 => -dx + dy,
            3 => -dx - dy,
            4 => dx,
            5 => -dx,
            6 => dy,
            _ => -dy,
        }
    }

    fn fade(t: f32) -> f32 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + t * (b - a)
    }

    fn sample(&self, x: f32, y: f32) -> f32 {
        let x_floor = x.floor();
        let y_floor = y.floor();
        let xi = x_floor as i32;
        let yi = y_floor as i32;
        let dx = x - x_floor;
        let dy = y - y_floor;

        let u = Self::fade(dx);
        let v = Self::fade(dy);

        let n00 = Self::gradient(self.corner_hash(xi, yi), dx, dy);
        let n10 = Self::gradient(self.corner_hash(xi + 1, yi), dx - 1.0, dy);
        let n01 = Self::gradient(self.corner_hash(xi, yi + 1), dx, dy - 1.0);
        let n11 = Self::gradient(self.corner_hash(xi + 1, yi + 1), dx - 1.0, dy - 1.0);

        Self::lerp(Self::lerp(n00, n10, u), Self::lerp(n01, n11, u), v)
    }

    /// Fractal sum: each successive octave multiplies amplitude by
    /// `persistence` and frequency by `lacunarity`.
    fn fractal(&self, x: f32, y: f32, octaves: u32, persistence: f32, lacunarity: f32) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }
        total
    }
}

/// A normalized 2D density field, one value per integer millimeter cell.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseField {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl NoiseField {
    /// Generates the density field for a board of the given dimensions.
    ///
    /// The field has one cell per integer millimeter. Values are normalized
    /// to [0, 1]; a degenerate flat field becomes uniform 0.5 rather than
    /// dividing by zero.
    pub fn generate(board_width: f32, board_height: f32, noise: &NoiseConfig, seed: u64) -> Self {
        let width = (board_width as usize).max(1);
        let height = (board_height as usize).max(1);

        let perlin = Perlin::new(seed);
        let mut values = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                values.push(perlin.fractal(
                    x as f32 / noise.scale,
                    y as f32 / noise.scale,
                    noise.octaves,
                    noise.persistence,
                    noise.lacunarity,
                ));
            }
        }

        let mut field = Self {
            width,
            height,
            values,
        };
        field.normalize();

        if noise.vignette_strength > 0.0 {
            field.apply_vignette(noise.vignette_strength);
            field.normalize();
        }

        field
    }

    /// Rescales values to span [0, 1] exactly.
    ///
    /// Idempotent: normalizing an already-normalized field leaves it
    /// unchanged up to float rounding. A flat field (max == min) is replaced
    /// by uniform 0.5.
    fn normalize(&mut self) {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in &self.values {
            min = min.min(v);
            max = max.max(v);
        }

        let span = max - min;
        if span < FLAT_EPSILON {
            warn!(width = self.width, height = self.height;
                "density field is flat, falling back to uniform 0.5");
            self.values.fill(0.5);
            return;
        }

        for v in &mut self.values {
            *v = (*v - min) / span;
        }
    }

    /// Multiplies each cell by a radial falloff: full weight at the center,
    /// `1 - strength` at the corners.
    fn apply_vignette(&mut self, strength: f32) {
        let center_x = self.width as f32 / 2.0;
        let center_y = self.height as f32 / 2.0;
        let max_dist = center_x.hypot(center_y);

        for y in 0..self.height {
            for x in 0..self.width {
                let dist = (x as f32 - center_x).hypot(y as f32 - center_y);
                let radial = 1.0 - dist / max_dist;
                let weight = (1.0 - strength) + strength * radial;
                self.values[y * self.width + x] *= weight;
            }
        }
    }

    /// Field width in cells (= whole millimeters of board width).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Field height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Samples the density at a board position, clamping to the field edge.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let ix = (x.max(0.0) as usize).min(self.width - 1);
        let iy = (y.max(0.0) as usize).min(self.height - 1);
        self.values[iy * self.width + ix]
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn config() -> NoiseConfig {
        NoiseConfig {
            scale: 25.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            vignette_strength: 0.5,
            seed: 7,
        }
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let a = NoiseField::generate(60.0, 40.0, &config(), 7);
        let b = NoiseField::generate(60.0, 40.0, &config(), 7);
        assert_eq!(a, b);

        let c = NoiseField::generate(60.0, 40.0, &config(), 8);
        assert_ne!(a, c);
    }

    #[test]
    fn values_span_the_unit_interval() {
        let field = NoiseField::generate(80.0, 80.0, &config(), 3);
        let min = field.values.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = field
            .values
            .iter()
            .cloned()
            .fold(f32::NEG_INFINITY, f32::max);
        assert!(approx_eq!(f32, min, 0.0, epsilon = 1e-6));
        assert!(approx_eq!(f32, max, 1.0, epsilon = 1e-6));
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut field = NoiseField::generate(50.0, 50.0, &config(), 11);
        let before = field.values.clone();
        field.normalize();
        for (a, b) in before.iter().zip(&field.values) {
            assert!(approx_eq!(f32, *a, *b, epsilon = 1e-5));
        }
    }

    #[test]
    fn flat_field_becomes_uniform_half() {
        let mut field = NoiseField {
            width: 4,
            height: 4,
            values: vec![0.37; 16],
        };
        field.normalize();
        assert!(field.values.iter().all(|&v| v == 0.5));
    }

    #[test]
    fn sample_clamps_to_the_field() {
        let field = NoiseField::generate(30.0, 20.0, &config(), 5);
        assert_eq!(field.sample(-5.0, -5.0), field.sample(0.0, 0.0));
        assert_eq!(field.sample(500.0, 500.0), field.sample(29.0, 19.0));
    }

    #[test]
    fn vignette_biases_toward_the_center() {
        let zero_vignette = NoiseConfig {
            vignette_strength: 0.0,
            ..config()
        };
        let strong_vignette = NoiseConfig {
            vignette_strength: 0.9,
            ..config()
        };
        let flat = NoiseField::generate(64.0, 64.0, &zero_vignette, 9);
        let biased = NoiseField::generate(64.0, 64.0, &strong_vignette, 9);

        // Average density over a centered window vs. the full field should
        // shift upward once the vignette weights the rim down.
        let mean = |f: &NoiseField, x0: usize, x1: usize, y0: usize, y1: usize| {
            let mut sum = 0.0;
            let mut n = 0;
            for y in y0..y1 {
                for x in x0..x1 {
                    sum += f.values[y * f.width + x];
                    n += 1;
                }
            }
            sum / n as f32
        };
        let flat_ratio = mean(&flat, 24, 40, 24, 40) / mean(&flat, 0, 64, 0, 64);
        let biased_ratio = mean(&biased, 24, 40, 24, 40) / mean(&biased, 0, 64, 0, 64);
        assert!(biased_ratio > flat_ratio);
    }
}
