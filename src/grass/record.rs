//! Per-blade record written by synthesis and read by shaping.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::grass::profile::BladeType;
use crate::math::frame::unit_to_angle;

/// Derived parameters for one blade, regenerated every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BladeRecord {
    // Geometry
    pub height: f32,
    pub width: f32,
    pub bend: f32,
    /// Continuous type trend in `[0, 1]`; see [`BladeRecord::blade_type`].
    pub blade_type: f32,

    // Clump linkage
    pub to_center: Vec2,
    pub presence: f32,
    pub clump_seed: f32,

    // Motion
    /// Facing angle mapped from `[-π, π]` to `[0, 1]`.
    pub facing01: f32,
    pub per_blade_hash: f32,
    pub wind_strength: f32,
    pub lod_seed: f32,
}

impl BladeRecord {
    pub fn blade_type(&self) -> BladeType {
        BladeType::from_trend(self.blade_type)
    }

    /// Facing angle in radians, `[-π, π]`.
    pub fn facing_angle(&self) -> f32 {
        unit_to_angle(self.facing01)
    }

    pub fn to_gpu(&self) -> GpuBladeRecord {
        GpuBladeRecord {
            height: self.height,
            width: self.width,
            bend: self.bend,
            blade_type: self.blade_type,
            to_center: self.to_center.to_array(),
            presence: self.presence,
            clump_seed: self.clump_seed,
            facing01: self.facing01,
            per_blade_hash: self.per_blade_hash,
            wind_strength: self.wind_strength,
            lod_seed: self.lod_seed,
        }
    }

    pub fn from_gpu(gpu: &GpuBladeRecord) -> Self {
        Self {
            height: gpu.height,
            width: gpu.width,
            bend: gpu.bend,
            blade_type: gpu.blade_type,
            to_center: Vec2::from_array(gpu.to_center),
            presence: gpu.presence,
            clump_seed: gpu.clump_seed,
            facing01: gpu.facing01,
            per_blade_hash: gpu.per_blade_hash,
            wind_strength: gpu.wind_strength,
            lod_seed: gpu.lod_seed,
        }
    }
}

/// GPU layout of a blade record (48 bytes, three vec4s).
/// Must match `BladeRecord` in grass_common.wgsl.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuBladeRecord {
    pub height: f32,
    pub width: f32,
    pub bend: f32,
    pub blade_type: f32,
    // -- 16 bytes --
    pub to_center: [f32; 2],
    pub presence: f32,
    pub clump_seed: f32,
    // -- 16 bytes --
    pub facing01: f32,
    pub per_blade_hash: f32,
    pub wind_strength: f32,
    pub lod_seed: f32,
    // -- 16 bytes --
    // Total: 48 bytes
}
