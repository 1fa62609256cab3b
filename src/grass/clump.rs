//! Voronoi clump partition of the ground plane.
//!
//! Clumps are never stored. Every query searches the 3×3 cell neighbourhood
//! for the nearest jittered seed, so the assignment is a pure function of
//! position and identical every frame.

use glam::{IVec2, Vec2};

use crate::math::frame::{safe_normalize2, smoothstep};
use crate::math::hash::hash2;

/// Smallest clump size / radius accepted before clamping.
const MIN_EXTENT: f32 = 1e-4;

/// Presence starts fading at this fraction of the clump radius.
pub const PRESENCE_FADE_START: f32 = 0.7;

/// Result of a nearest-seed query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClumpSample {
    /// Lattice cell owning the nearest seed.
    pub cell_id: IVec2,
    /// Seed jitter within its cell, in `[0, 1)²`.
    pub seed_offset: Vec2,
    /// Distance from the query to the seed, in world units.
    pub distance_to_center: f32,
    /// Unit direction from the query toward the seed; `(1, 0)` at the seed itself.
    pub direction_to_center: Vec2,
}

/// Seed of `cell` in cell space.
#[inline]
pub fn seed_point(cell: IVec2) -> Vec2 {
    let c = cell.as_vec2();
    c + hash2(c)
}

/// Nearest jittered seed to `world_xz` on a lattice of `clump_size` cells.
///
/// Neighbours are visited row-major (z outer, x inner) with a strict `<`, so
/// the first of equidistant seeds wins.
pub fn nearest_clump(world_xz: Vec2, clump_size: f32) -> ClumpSample {
    let size = clump_size.max(MIN_EXTENT);
    let p = world_xz / size;
    let base = p.floor().as_ivec2();

    let mut best_cell = base;
    let mut best_seed = seed_point(base);
    let mut best_d2 = f32::INFINITY;
    for dz in -1..=1 {
        for dx in -1..=1 {
            let cell = base + IVec2::new(dx, dz);
            let seed = seed_point(cell);
            let d2 = (seed - p).length_squared();
            if d2 < best_d2 {
                best_d2 = d2;
                best_cell = cell;
                best_seed = seed;
            }
        }
    }

    ClumpSample {
        cell_id: best_cell,
        seed_offset: hash2(best_cell.as_vec2()),
        distance_to_center: best_d2.sqrt() * size,
        direction_to_center: safe_normalize2(best_seed - p),
    }
}

/// World position of a clump's center.
pub fn clump_center(cell: IVec2, clump_size: f32) -> Vec2 {
    seed_point(cell) * clump_size.max(MIN_EXTENT)
}

/// Presence factor: 1 near the center, smooth fade over the outer 30% of the
/// radius, 0 from the radius outward.
pub fn presence(distance_to_center: f32, clump_radius: f32) -> f32 {
    let r = (distance_to_center / clump_radius.max(MIN_EXTENT)).clamp(0.0, 1.0);
    1.0 - smoothstep(PRESENCE_FADE_START, 1.0, r)
}
