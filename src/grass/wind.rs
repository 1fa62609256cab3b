//! Wind deformation of blade control points.
//!
//! Offsets are computed in world space from the normalized wind direction,
//! then rotated into the blade's local frame so the later facing rotation
//! carries them back out unchanged.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use crate::grass::config::WindParams;
use crate::math::bezier::CubicBezier;
use crate::math::frame::{lerp, safe_normalize2, smoothstep, yaw_rotation};
use crate::math::hash::{hash21, taps};

/// Push weight on control points 1..=3 (root is pinned).
pub const PUSH_WEIGHTS: [f32; 3] = [0.15, 0.5, 1.0];
/// Sway weight on control points 1..=3.
pub const SWAY_WEIGHTS: [f32; 3] = [0.25, 0.55, 1.0];

/// Per-blade inputs to the wind model.
#[derive(Clone, Copy, Debug)]
pub struct WindInput {
    pub world_xz: Vec2,
    pub height: f32,
    /// Sampled strength in `[0, 1]`, already scaled by the configured strength.
    pub strength: f32,
    pub per_blade_hash: f32,
    pub time: f32,
}

pub struct WindModel<'a> {
    params: &'a WindParams,
    dir: Vec2,
}

impl<'a> WindModel<'a> {
    pub fn new(params: &'a WindParams) -> Self {
        Self { params, dir: safe_normalize2(Vec2::from_array(params.direction)) }
    }

    pub fn direction(&self) -> Vec2 {
        self.dir
    }

    /// Wind influence multiplier for a camera distance: 1 up to
    /// `distance_start`, 0 from `distance_end` on.
    pub fn distance_falloff(&self, camera_distance: f32) -> f32 {
        1.0 - smoothstep(self.params.distance_start, self.params.distance_end, camera_distance)
    }

    /// Steady push at the tip, world space.
    pub fn push_offset(&self, input: &WindInput) -> Vec3 {
        let amount = input.height * self.params.push_strength * input.strength;
        Vec3::new(self.dir.x, 0.0, self.dir.y) * amount
    }

    /// Oscillating sway at the tip, world space.
    pub fn sway_offset(&self, input: &WindInput) -> Vec3 {
        let p = self.params;
        let amplitude = input.height * input.strength * p.sway_strength;
        if amplitude == 0.0 {
            return Vec3::ZERO;
        }

        let phase = input.per_blade_hash * TAU;
        let gust = 0.5 + 0.5 * (input.time * p.gust_frequency * TAU + phase).sin();
        let wave = input.world_xz.dot(self.dir) * p.wave_scale;
        let frequency = lerp(
            p.sway_freq_min,
            p.sway_freq_max,
            hash21(input.world_xz, taps::FREQUENCY),
        );
        let main = (input.time * frequency * TAU - wave + phase).sin();
        let flutter = (input.time * p.flutter_frequency * TAU + phase * 3.7).sin() * p.flutter_strength;

        let cross = Vec2::new(-self.dir.y, self.dir.x);
        let sway_dir = safe_normalize2(self.dir + cross * (flutter * p.cross_wind));
        let along = (main + flutter) * (0.5 + 0.5 * gust) * amplitude;
        Vec3::new(sway_dir.x, 0.0, sway_dir.y) * along
    }

    /// Displace the three non-root control points of a blade-local curve.
    ///
    /// `facing` is the blade's yaw; `falloff` scales the whole effect.
    pub fn deform(&self, curve: &mut CubicBezier, input: &WindInput, facing: f32, falloff: f32) {
        if falloff <= 0.0 || input.strength <= 0.0 {
            return;
        }
        let to_local = yaw_rotation(facing).inverse();
        let push = to_local * (self.push_offset(input) * falloff);
        let sway = to_local * (self.sway_offset(input) * falloff);
        for i in 0..3 {
            curve.points[i + 1] += push * PUSH_WEIGHTS[i] + sway * SWAY_WEIGHTS[i];
        }
    }
}
