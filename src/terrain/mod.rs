//! Terrain sampling interface consumed by the blade shaper
//!
//! The grass core only ever asks two questions of the ground: how high is it
//! at a world XZ, and which way does it face there.

pub mod generator;
pub use generator::{TerrainGenerator, TerrainParams};

use glam::{Vec2, Vec3};

/// Pure height/normal queries by world XZ.
pub trait TerrainSampler: Send + Sync {
    /// Ground height at a world XZ position.
    fn height(&self, xz: Vec2) -> f32;

    /// Unit ground normal at a world XZ position.
    fn normal(&self, xz: Vec2) -> Vec3;
}

/// Planar ground `h(x, z) = base + gradient · (x, z)`.
///
/// With a zero gradient this is flat ground at `base`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaneTerrain {
    pub base: f32,
    pub gradient: Vec2,
}

impl PlaneTerrain {
    pub fn flat(base: f32) -> Self {
        Self { base, gradient: Vec2::ZERO }
    }

    pub fn sloped(base: f32, gradient: Vec2) -> Self {
        Self { base, gradient }
    }
}

impl TerrainSampler for PlaneTerrain {
    fn height(&self, xz: Vec2) -> f32 {
        self.base + self.gradient.dot(xz)
    }

    fn normal(&self, _xz: Vec2) -> Vec3 {
        Vec3::new(-self.gradient.x, 1.0, -self.gradient.y).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_plane() {
        let t = PlaneTerrain::flat(2.5);
        assert_eq!(t.height(Vec2::new(10.0, -3.0)), 2.5);
        assert_eq!(t.normal(Vec2::ZERO), Vec3::Y);
    }

    #[test]
    fn test_sloped_plane_normal_is_perpendicular() {
        let t = PlaneTerrain::sloped(0.0, Vec2::new(0.5, -0.25));
        let n = t.normal(Vec2::ZERO);
        // Tangents along x and z
        let tx = Vec3::new(1.0, t.gradient.x, 0.0);
        let tz = Vec3::new(0.0, t.gradient.y, 1.0);
        assert!(n.dot(tx).abs() < 1e-6);
        assert!(n.dot(tz).abs() < 1e-6);
        assert!(n.y > 0.0);
    }
}
