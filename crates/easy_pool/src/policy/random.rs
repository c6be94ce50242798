//! Randomizers
//!
//! Interchangeable sources of samples in `[-1, 1)`. Every randomizer owns a
//! seedable `ChaCha8Rng`, so a seeded policy replays the same positions.

use crate::foundation::math::{Vec2, Vec3};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Largest sample a randomizer returns
pub const SAMPLE_MAX: f32 = 1.0 - f32::EPSILON;

/// Sampling contract shared by all randomizers
pub trait Randomizer: Send {
    /// Sample in `[-1, 1)`
    fn sample(&mut self) -> f32;

    /// Sample in `[min, max)`
    fn sample_range(&mut self, min: f32, max: f32) -> f32 {
        (self.sample() + 1.0) * 0.5 * (max - min) + min
    }

    /// Two independent samples
    fn sample_vector2(&mut self) -> Vec2 {
        let x = self.sample();
        let y = self.sample();
        Vec2::new(x, y)
    }

    /// Three independent samples
    fn sample_vector3(&mut self) -> Vec3 {
        let x = self.sample();
        let y = self.sample();
        let z = self.sample();
        Vec3::new(x, y, z)
    }
}

fn clamp_sample(value: f32) -> f32 {
    value.clamp(-1.0, SAMPLE_MAX)
}

/// Uniformly distributed samples
#[derive(Debug, Clone)]
pub struct UniformRandom {
    rng: ChaCha8Rng,
}

impl UniformRandom {
    /// Deterministic randomizer
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Randomizer seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl Default for UniformRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl Randomizer for UniformRandom {
    fn sample(&mut self) -> f32 {
        clamp_sample((self.rng.gen::<f32>() - 0.5) * 2.0)
    }
}

/// Normally distributed samples via Box-Muller
///
/// Values outside `[-1, 1)` are clamped rather than redrawn, so the extremes
/// are slightly over-represented.
#[derive(Debug, Clone)]
pub struct GaussianRandom {
    rng: ChaCha8Rng,
}

impl GaussianRandom {
    /// Deterministic randomizer
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Randomizer seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl Randomizer for GaussianRandom {
    fn sample(&mut self) -> f32 {
        // Both in (0, 1]
        let u1 = 1.0 - self.rng.gen::<f64>();
        let u2 = 1.0 - self.rng.gen::<f64>();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).sin();
        clamp_sample(z as f32)
    }
}

/// Samples read from 2D Perlin noise at random coordinates
///
/// `range` bounds the coordinates; larger ranges visit more noise cells.
#[derive(Debug, Clone)]
pub struct PerlinNoiseRandom {
    range: f32,
    rng: ChaCha8Rng,
    permutation: Vec<u8>,
}

impl PerlinNoiseRandom {
    /// Deterministic randomizer
    pub fn new(range: f32, seed: u64) -> Self {
        Self::with_rng(range, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Randomizer seeded from the operating system
    pub fn from_entropy(range: f32) -> Self {
        Self::with_rng(range, ChaCha8Rng::from_entropy())
    }

    fn with_rng(range: f32, mut rng: ChaCha8Rng) -> Self {
        let mut table: Vec<u8> = (0..=255).collect();
        table.shuffle(&mut rng);

        let mut permutation = table.clone();
        permutation.extend_from_slice(&table);

        Self {
            range,
            rng,
            permutation,
        }
    }

    /// Noise value at `(x, y)`, roughly in `[0, 1]`, exactly 0.5 on lattice points
    pub fn noise(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let xf = x - x0;
        let yf = y - y0;
        let xi = (x0 as i64 & 255) as usize;
        let yi = (y0 as i64 & 255) as usize;

        let p = &self.permutation;
        let a = p[xi] as usize + yi;
        let b = p[xi + 1] as usize + yi;

        let u = fade(xf);
        let v = fade(yf);

        let bottom = lerp(grad(p[a], xf, yf), grad(p[b], xf - 1.0, yf), u);
        let top = lerp(grad(p[a + 1], xf, yf - 1.0), grad(p[b + 1], xf - 1.0, yf - 1.0), u);

        ((lerp(bottom, top, v) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

impl Randomizer for PerlinNoiseRandom {
    fn sample(&mut self) -> f32 {
        let x = self.rng.gen::<f32>() * self.range;
        let y = self.rng.gen::<f32>() * self.range;
        clamp_sample((self.noise(x, y) - 0.5) * 2.0)
    }
}

fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

fn grad(hash: u8, x: f32, y: f32) -> f32 {
    match hash & 3 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        _ => -x - y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_in_range(randomizer: &mut dyn Randomizer) {
        for _ in 0..10_000 {
            let s = randomizer.sample();
            assert!((-1.0..1.0).contains(&s), "sample {} out of range", s);
        }
    }

    #[test]
    fn test_samples_stay_in_range() {
        assert_in_range(&mut UniformRandom::new(1));
        assert_in_range(&mut GaussianRandom::new(2));
        assert_in_range(&mut PerlinNoiseRandom::new(10.0, 3));
    }

    #[test]
    fn test_sample_range_maps_interval() {
        let mut randomizer = UniformRandom::new(4);
        for _ in 0..1_000 {
            let s = randomizer.sample_range(5.0, 7.0);
            assert!((5.0..7.0).contains(&s));
        }
    }

    #[test]
    fn test_seeded_randomizers_repeat() {
        let mut a = GaussianRandom::new(42);
        let mut b = GaussianRandom::new(42);
        for _ in 0..100 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn test_gaussian_is_centered() {
        let mut randomizer = GaussianRandom::new(7);
        let n = 20_000;
        let mean: f32 = (0..n).map(|_| randomizer.sample()).sum::<f32>() / n as f32;
        assert!(mean.abs() < 0.05, "mean {}", mean);
    }

    #[test]
    fn test_uniform_covers_both_halves() {
        let mut randomizer = UniformRandom::new(9);
        let samples: Vec<f32> = (0..1_000).map(|_| randomizer.sample()).collect();
        assert!(samples.iter().any(|s| *s < -0.5));
        assert!(samples.iter().any(|s| *s > 0.5));
    }

    #[test]
    fn test_perlin_lattice_points_are_neutral() {
        let randomizer = PerlinNoiseRandom::new(1.0, 5);
        assert_relative_eq!(randomizer.noise(3.0, 8.0), 0.5, epsilon = 1e-6);
        assert_relative_eq!(randomizer.noise(0.0, 0.0), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_perlin_is_continuous() {
        let randomizer = PerlinNoiseRandom::new(1.0, 5);
        let a = randomizer.noise(1.25, 2.5);
        let b = randomizer.noise(1.2501, 2.5);
        assert!((a - b).abs() < 1e-3);
    }
}
