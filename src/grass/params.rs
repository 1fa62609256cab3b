//! GPU-ready grass uniform (288 bytes, 16-byte aligned).
//!
//! Flattens a [`GrassConfig`] snapshot plus the frame time into the layout
//! both grass shaders read. Camera and light live in the frame uniform.

use bytemuck::{Pod, Zeroable};

use crate::grass::config::GrassConfig;
use crate::grass::profile::{gpu_profile_table, BladeProfile};
use crate::math::frame::safe_normalize2;

/// GPU uniform for the grass pipeline. Must match `GrassParams` in grass_common.wgsl.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GrassParams {
    pub height_min: f32,
    pub height_max: f32,
    pub width_min: f32,
    pub width_max: f32,
    // -- 16 bytes --
    pub bend_min: f32,
    pub bend_max: f32,
    pub height_randomness: f32,
    pub width_randomness: f32,
    // -- 16 bytes --
    pub bend_randomness: f32,
    pub base_width: f32,
    pub tip_thin: f32,
    pub type_trend_scale: f32,
    // -- 16 bytes --
    pub view_thicken: f32,
    pub clump_size: f32,
    pub clump_radius: f32,
    pub cone_strength: f32,
    // -- 16 bytes --
    pub center_yaw: f32,
    pub blade_yaw: f32,
    pub clump_yaw: f32,
    pub wind_facing: f32,
    // -- 16 bytes --
    /// Normalized on the CPU.
    pub wind_direction: [f32; 2],
    pub wind_speed: f32,
    pub wind_strength: f32,
    // -- 16 bytes --
    pub wind_scale: f32,
    pub push_strength: f32,
    pub sway_strength: f32,
    pub sway_freq_min: f32,
    // -- 16 bytes --
    pub sway_freq_max: f32,
    pub gust_frequency: f32,
    pub wave_scale: f32,
    pub flutter_frequency: f32,
    // -- 16 bytes --
    pub flutter_strength: f32,
    pub cross_wind: f32,
    pub wind_distance_start: f32,
    pub wind_distance_end: f32,
    // -- 16 bytes --
    pub lod_start: f32,
    pub lod_end: f32,
    pub cull_start: f32,
    pub cull_end: f32,
    // -- 16 bytes --
    pub width_compensation: f32,
    pub shrink_band: f32,
    pub time: f32,
    pub segments: u32,
    // -- 16 bytes --
    pub origin: [f32; 3],
    pub blade_count: u32,
    // -- 16 bytes --
    pub base_color: [f32; 3],
    pub clump_tint: f32,
    // -- 16 bytes --
    pub tip_color: [f32; 3],
    pub translucency: f32,
    // -- 16 bytes --
    pub ambient: f32,
    pub seed: u32,
    pub _pad: [f32; 2],
    // -- 16 bytes --
    pub profiles: [BladeProfile; 3],
    // -- 48 bytes --
    // Total: 288 bytes
}

impl GrassParams {
    pub fn from_config(config: &GrassConfig, time: f32, blade_count: u32) -> Self {
        let s = &config.shape;
        let w = &config.wind;
        let dir = safe_normalize2(glam::Vec2::from_array(w.direction));
        Self {
            height_min: s.height_min,
            height_max: s.height_max,
            width_min: s.width_min,
            width_max: s.width_max,
            bend_min: s.bend_min,
            bend_max: s.bend_max,
            height_randomness: s.height_randomness,
            width_randomness: s.width_randomness,
            bend_randomness: s.bend_randomness,
            base_width: s.base_width,
            tip_thin: s.tip_thin,
            type_trend_scale: s.type_trend_scale,
            view_thicken: s.view_thicken,
            clump_size: config.clump.clump_size,
            clump_radius: config.clump.clump_radius,
            cone_strength: config.clump.cone_strength,
            center_yaw: config.angle.center_yaw,
            blade_yaw: config.angle.blade_yaw,
            clump_yaw: config.angle.clump_yaw,
            wind_facing: w.facing,
            wind_direction: dir.to_array(),
            wind_speed: w.speed,
            wind_strength: w.strength,
            wind_scale: w.scale,
            push_strength: w.push_strength,
            sway_strength: w.sway_strength,
            sway_freq_min: w.sway_freq_min,
            sway_freq_max: w.sway_freq_max,
            gust_frequency: w.gust_frequency,
            wave_scale: w.wave_scale,
            flutter_frequency: w.flutter_frequency,
            flutter_strength: w.flutter_strength,
            cross_wind: w.cross_wind,
            wind_distance_start: w.distance_start,
            wind_distance_end: w.distance_end,
            lod_start: config.lod.start,
            lod_end: config.lod.end,
            cull_start: config.cull.start,
            cull_end: config.cull.end,
            width_compensation: config.cull.width_compensation,
            shrink_band: config.cull.shrink_band,
            time,
            segments: config.segments.max(1),
            origin: config.patch.origin,
            blade_count,
            base_color: config.color.base_color,
            clump_tint: config.color.clump_tint,
            tip_color: config.color.tip_color,
            translucency: config.color.translucency,
            ambient: config.color.ambient,
            seed: config.seed,
            _pad: [0.0; 2],
            profiles: gpu_profile_table(),
        }
    }
}
