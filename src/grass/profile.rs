//! Blade shape profiles.
//!
//! Three closed profiles differ only in where the bend sits along the blade.
//! Each maps to a fixed pair of mid control-point offsets; the root is always
//! at the origin and the tip at `(0, height, 0)`. The table is uploaded to the
//! GPU as-is so both paths share one source of truth.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::math::bezier::CubicBezier;

/// Discrete blade profile, selected from the continuous type trend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BladeType {
    /// Bend concentrated near the root; blades splay from the base.
    LowBend,
    /// Even arc through the middle.
    MidBend,
    /// Straight lower stem, bend near the tip.
    HighBend,
}

impl BladeType {
    pub const ALL: [BladeType; 3] = [BladeType::LowBend, BladeType::MidBend, BladeType::HighBend];

    /// `floor(trend * 3)`, clamped to the three profiles.
    pub fn from_trend(trend: f32) -> Self {
        let idx = (trend * 3.0).floor();
        if !(idx >= 1.0) {
            BladeType::LowBend
        } else if idx < 2.0 {
            BladeType::MidBend
        } else {
            BladeType::HighBend
        }
    }

    pub fn index(self) -> usize {
        match self {
            BladeType::LowBend => 0,
            BladeType::MidBend => 1,
            BladeType::HighBend => 2,
        }
    }

    pub fn profile(self) -> BladeProfile {
        BLADE_PROFILES[self.index()]
    }

    /// Unbent control points for a blade of `height` and `bend`.
    pub fn control_points(self, height: f32, bend: f32) -> CubicBezier {
        self.profile().control_points(height, bend)
    }
}

/// Mid control-point placement. Each `[along, forward]` pair gives the
/// height fraction and the forward (+Z) offset as a multiple of `bend * height`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BladeProfile {
    pub lower: [f32; 2],
    pub upper: [f32; 2],
}

impl BladeProfile {
    pub fn control_points(&self, height: f32, bend: f32) -> CubicBezier {
        let reach = bend * height;
        CubicBezier::new(
            Vec3::ZERO,
            Vec3::new(0.0, self.lower[0] * height, self.lower[1] * reach),
            Vec3::new(0.0, self.upper[0] * height, self.upper[1] * reach),
            Vec3::new(0.0, height, 0.0),
        )
    }
}

/// Profiles indexed by [`BladeType::index`]. Uploaded through
/// `GrassParams::profiles` and read by blade_render.wgsl.
pub const BLADE_PROFILES: [BladeProfile; 3] = [
    BladeProfile { lower: [0.22, 1.1], upper: [0.6, 0.8] },
    BladeProfile { lower: [0.33, 0.5], upper: [0.66, 1.0] },
    BladeProfile { lower: [0.45, 0.1], upper: [0.78, 1.25] },
];

/// Profile table as uploaded to the GPU (16-byte uniform array stride).
pub fn gpu_profile_table() -> [BladeProfile; 3] {
    BLADE_PROFILES
}
