//! Noise-based procedural terrain height field

use glam::{Vec2, Vec3};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use super::TerrainSampler;

/// Parameters controlling the height field
#[derive(Clone, Debug)]
pub struct TerrainParams {
    pub seed: u32,
    pub scale: f32,        // Horizontal scale (larger = smoother)
    pub height_scale: f32, // Vertical scale (max height)
    pub octaves: u32,      // FBM octaves (detail levels)
    pub persistence: f32,  // FBM persistence (0.5 typical)
    pub lacunarity: f32,   // FBM lacunarity (2.0 typical)
    /// Finite-difference step for normals, in meters.
    pub normal_epsilon: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            scale: 40.0,
            height_scale: 4.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            normal_epsilon: 0.05,
        }
    }
}

/// Rolling terrain from fractal Brownian motion (FBM) over Perlin noise
pub struct TerrainGenerator {
    params: TerrainParams,
    noise: Fbm<Perlin>,
}

impl TerrainGenerator {
    /// Create a new terrain generator with the given parameters
    pub fn new(params: TerrainParams) -> Self {
        let noise = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);

        Self { params, noise }
    }

    /// Get terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Get terrain height at world position (x, z)
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let nx = (x / self.params.scale) as f64;
        let nz = (z / self.params.scale) as f64;

        // Noise in [-1, 1] mapped to [0, height_scale]
        let noise_value = self.noise.get([nx, nz]).clamp(-1.0, 1.0);
        let normalized = (noise_value + 1.0) / 2.0;
        (normalized * self.params.height_scale as f64) as f32
    }

    /// Central-difference surface normal at (x, z)
    pub fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        let eps = self.params.normal_epsilon.max(1e-4);
        let dh_dx = (self.height_at(x + eps, z) - self.height_at(x - eps, z)) / (2.0 * eps);
        let dh_dz = (self.height_at(x, z + eps) - self.height_at(x, z - eps)) / (2.0 * eps);
        Vec3::new(-dh_dx, 1.0, -dh_dz).normalize()
    }
}

impl TerrainSampler for TerrainGenerator {
    fn height(&self, xz: Vec2) -> f32 {
        self.height_at(xz.x, xz.y)
    }

    fn normal(&self, xz: Vec2) -> Vec3 {
        self.normal_at(xz.x, xz.y)
    }
}
