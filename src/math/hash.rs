//! Stateless hash functions over 2D coordinates.
//!
//! Every pseudo-random value in the grass pipeline is a pure function of a
//! position; there is no seeded RNG state anywhere. These are the classic
//! `fract(sin(x) * k)` mixers, mirrored in `shaders/grass_common.wgsl`.

use glam::Vec2;

/// Large multiplier for the sine mixer.
pub const HASH_SCALE: f32 = 43758.5453;

/// Fractional part in `[0, 1)`.
///
/// `x - floor(x)` can round up to exactly 1.0 for tiny negative inputs; that
/// case wraps to 0.0.
#[inline]
pub fn fract(x: f32) -> f32 {
    let f = x - x.floor();
    if f >= 1.0 { 0.0 } else { f }
}

/// Scalar hash in `[0, 1)`.
#[inline]
pub fn hash1(x: f32) -> f32 {
    fract(x.sin() * HASH_SCALE)
}

/// Vector hash in `[0, 1)²`.
#[inline]
pub fn hash2(p: Vec2) -> Vec2 {
    let q = Vec2::new(
        p.dot(Vec2::new(127.1, 311.7)),
        p.dot(Vec2::new(269.5, 183.3)),
    );
    Vec2::new(hash1(q.x), hash1(q.y))
}

/// Scalar hash of a 2D point through a dot-product tap.
///
/// Different `tap` vectors give decorrelated streams from the same point.
#[inline]
pub fn hash21(p: Vec2, tap: Vec2) -> f32 {
    hash1(p.dot(tap))
}

/// Mixing taps used by the parameter synthesizer. Each consumer gets its own
/// constant so unrelated effects (rotation, LOD, tint) don't line up.
pub mod taps {
    use glam::Vec2;

    pub const BLADE: Vec2 = Vec2::new(12.9898, 78.233);
    pub const LOD: Vec2 = Vec2::new(39.3468, 11.135);
    pub const CLUMP_SEED: Vec2 = Vec2::new(7.13, 157.1);
    pub const BEND: Vec2 = Vec2::new(93.989, 67.345);
    pub const FREQUENCY: Vec2 = Vec2::new(26.651, 44.117);
    /// Offsets applied to a clump cell before its two geometry hashes.
    pub const CLUMP_GEOMETRY_A: Vec2 = Vec2::new(17.0, 59.4);
    pub const CLUMP_GEOMETRY_B: Vec2 = Vec2::new(-41.3, 7.9);
    /// Offset applied to a blade position before its jitter hash.
    pub const BLADE_JITTER: Vec2 = Vec2::new(0.173, 0.619);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash1_range() {
        for i in -500..500 {
            let h = hash1(i as f32 * 0.731);
            assert!((0.0..1.0).contains(&h), "hash1 out of range: {}", h);
        }
    }

    #[test]
    fn test_hash2_range() {
        for ix in -20..20 {
            for iz in -20..20 {
                let h = hash2(Vec2::new(ix as f32, iz as f32));
                assert!((0.0..1.0).contains(&h.x));
                assert!((0.0..1.0).contains(&h.y));
            }
        }
    }

    #[test]
    fn test_hash_is_pure() {
        let p = Vec2::new(3.25, -7.5);
        assert_eq!(hash2(p), hash2(p));
        assert_eq!(hash21(p, taps::BLADE), hash21(p, taps::BLADE));
    }

    #[test]
    fn test_fract_never_returns_one() {
        assert_eq!(fract(-1e-9), 0.0);
        assert!(fract(-0.25) > 0.74 && fract(-0.25) < 0.76);
        assert_eq!(fract(2.0), 0.0);
    }

    #[test]
    fn test_taps_decorrelate() {
        // Distinct taps should not produce identical streams over a small grid.
        let mut equal = 0;
        for i in 0..64 {
            let p = Vec2::new(i as f32 * 0.37, i as f32 * 0.11);
            if hash21(p, taps::BLADE) == hash21(p, taps::LOD) {
                equal += 1;
            }
        }
        assert!(equal < 2);
    }

    #[test]
    fn test_neighbouring_cells_differ() {
        let a = hash2(Vec2::new(0.0, 0.0));
        let b = hash2(Vec2::new(1.0, 0.0));
        let c = hash2(Vec2::new(0.0, 1.0));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
