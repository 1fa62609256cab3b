//! Per-blade parameter synthesis.
//!
//! One call per blade per frame, no state shared between calls. Output is a
//! pure function of the blade's world position, its index, the config
//! snapshot and the simulation time. This is the CPU twin of
//! `shaders/blade_compute.wgsl`.

use std::f32::consts::TAU;

use glam::{IVec2, Vec2};

use crate::grass::clump::{nearest_clump, presence, ClumpSample};
use crate::grass::config::GrassConfig;
use crate::grass::patch::BladeInstance;
use crate::grass::record::BladeRecord;
use crate::math::frame::{
    angle_delta, angle_to_unit, lerp, safe_normalize2, wrap_angle, PatchTransform,
};
use crate::math::hash::{hash1, hash2, hash21, taps};
use crate::math::noise::NoiseField;

/// Octaves of the clump type-trend noise.
pub const TYPE_TREND_OCTAVES: u32 = 3;
/// Octaves of the wind-strength noise.
pub const WIND_OCTAVES: u32 = 2;
/// Blade geometry never collapses below this.
const MIN_DIMENSION: f32 = 1e-4;

/// Geometry shared by every blade of one clump.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClumpBase {
    pub height: f32,
    pub width: f32,
    pub bend: f32,
    /// Per-clump yaw offset in radians.
    pub yaw: f32,
    /// Type trend in `[0, 1]`.
    pub type_trend: f32,
    /// Independent clump hash for tinting.
    pub seed: f32,
}

/// Borrowed view of everything synthesis reads during a frame.
pub struct BladeSynthesizer<'a> {
    config: &'a GrassConfig,
    noise: &'a NoiseField,
    transform: PatchTransform,
    wind_dir: Vec2,
}

impl<'a> BladeSynthesizer<'a> {
    pub fn new(config: &'a GrassConfig, noise: &'a NoiseField, transform: PatchTransform) -> Self {
        let wind_dir = safe_normalize2(Vec2::from_array(config.wind.direction));
        Self { config, noise, transform, wind_dir }
    }

    /// Clump-level parameters from two independent hashes of the cell id and
    /// a smooth noise trend over cell ids.
    pub fn clump_base(&self, cell_id: IVec2) -> ClumpBase {
        let shape = &self.config.shape;
        let cell = cell_id.as_vec2();
        let a = hash2(cell + taps::CLUMP_GEOMETRY_A);
        let b = hash2(cell + taps::CLUMP_GEOMETRY_B);

        let type_trend = self
            .noise
            .fbm01(cell * shape.type_trend_scale, TYPE_TREND_OCTAVES);

        ClumpBase {
            height: lerp(shape.height_min, shape.height_max, a.x),
            width: lerp(shape.width_min, shape.width_max, a.y),
            bend: lerp(shape.bend_min, shape.bend_max, b.x),
            yaw: (b.y - 0.5) * TAU * self.config.angle.clump_yaw,
            type_trend,
            seed: hash21(cell, taps::CLUMP_SEED),
        }
    }

    /// Facing before any wind influence, in `[-π, π]`.
    pub fn base_facing(&self, clump: &ClumpSample, base: &ClumpBase, per_blade_hash: f32) -> f32 {
        let angle = &self.config.angle;
        let toward_center = clump.direction_to_center.y.atan2(clump.direction_to_center.x);
        let random = (per_blade_hash - 0.5) * TAU;
        wrap_angle(toward_center * angle.center_yaw + random * angle.blade_yaw + base.yaw)
    }

    /// Wind strength in `[0, 1]` from fbm scrolled downwind over time.
    pub fn wind_strength(&self, world_xz: Vec2, time: f32) -> f32 {
        let wind = &self.config.wind;
        if wind.strength <= 0.0 {
            return 0.0;
        }
        let p = world_xz * wind.scale - self.wind_dir * (time * wind.speed);
        (self.noise.fbm01(p, WIND_OCTAVES) * wind.strength).clamp(0.0, 1.0)
    }

    /// Turn `facing` toward the wind by `wind.facing * strength` along the
    /// shortest arc.
    pub fn blend_toward_wind(&self, facing: f32, wind_strength: f32) -> f32 {
        let weight = (self.config.wind.facing * wind_strength).clamp(0.0, 1.0);
        if weight <= 0.0 {
            return facing;
        }
        let wind_angle = self.wind_dir.y.atan2(self.wind_dir.x);
        wrap_angle(facing + angle_delta(facing, wind_angle) * weight)
    }

    pub fn synthesize(&self, instance: &BladeInstance, time: f32) -> BladeRecord {
        let shape = &self.config.shape;
        let world = self.transform.to_world(instance.position);
        let xz = world.xz();

        // 1. clump
        let clump = nearest_clump(xz, self.config.clump.clump_size);

        // 2. clump-level geometry
        let base = self.clump_base(clump.cell_id);

        // 3. per-blade jitter, keyed by position not cell
        let jitter = hash2(xz + taps::BLADE_JITTER) * 2.0 - Vec2::ONE;
        let bend_jitter = hash21(xz, taps::BEND) * 2.0 - 1.0;
        let height = (base.height * (1.0 + jitter.x * shape.height_randomness)).max(MIN_DIMENSION);
        let width = (base.width * (1.0 + jitter.y * shape.width_randomness)).max(MIN_DIMENSION);
        let bend = (base.bend * (1.0 + bend_jitter * shape.bend_randomness)).max(0.0);

        // 4. decorrelated seeds
        let per_blade_hash = hash21(xz, taps::BLADE);
        let index_phase = (instance.index & 1023) as f32 * 0.1031;
        let lod_seed = hash1(xz.dot(taps::LOD) + index_phase);

        // 5-7. facing
        let facing = self.base_facing(&clump, &base, per_blade_hash);
        let wind_strength = self.wind_strength(xz, time);
        let facing = self.blend_toward_wind(facing, wind_strength);

        BladeRecord {
            height,
            width,
            bend,
            blade_type: base.type_trend,
            to_center: clump.direction_to_center,
            presence: presence(clump.distance_to_center, self.config.clump.clump_radius),
            clump_seed: base.seed,
            facing01: angle_to_unit(facing),
            per_blade_hash,
            wind_strength,
            lod_seed,
        }
    }
}
