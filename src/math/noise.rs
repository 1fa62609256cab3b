//! Fractal simplex noise for wind strength and clump type trends.

use glam::Vec2;
use noise::{NoiseFn, Simplex};

/// Multi-octave simplex noise field.
///
/// Pure function of `(seed, position, octaves)`; cheap to clone and share
/// across rayon workers.
#[derive(Clone)]
pub struct NoiseField {
    seed: u32,
    simplex: Simplex,
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            simplex: Simplex::new(seed),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Single simplex octave, roughly in `[-1, 1]`.
    pub fn sample(&self, p: Vec2) -> f32 {
        self.simplex.get([p.x as f64, p.y as f64]) as f32
    }

    /// Fractal sum of `octaves` simplex octaves (frequency doubling,
    /// amplitude halving), normalised so the result stays roughly in `[-1, 1]`.
    ///
    /// `octaves == 0` yields 0.
    pub fn fbm(&self, p: Vec2, octaves: u32) -> f32 {
        let mut sum = 0.0;
        let mut amplitude = 0.5;
        let mut total = 0.0;
        let mut frequency = 1.0;
        for _ in 0..octaves {
            sum += amplitude * self.sample(p * frequency);
            total += amplitude;
            frequency *= 2.0;
            amplitude *= 0.5;
        }
        if total > 0.0 { sum / total } else { 0.0 }
    }

    /// `fbm` remapped from `[-1, 1]` into `[0, 1]` and clamped.
    pub fn fbm01(&self, p: Vec2, octaves: u32) -> f32 {
        (self.fbm(p, octaves) * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish()
    }
}
