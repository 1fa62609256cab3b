//! Scalar helpers, degeneracy-safe vector ops, and explicit coordinate frames.
//!
//! Y is up in every frame. Blade instances live in patch object space
//! ([`ObjectPoint`]); everything that must agree across patches (hashing,
//! clumps, wind, camera distance) runs on [`WorldPoint`]s produced by
//! [`PatchTransform::to_world`].

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Quat, Vec2, Vec3};

/// Squared-length threshold under which a vector is treated as zero.
pub const DEGENERATE_LENGTH_SQ: f32 = 1e-6;

/// Hermite smoothstep. `edge1 <= edge0` degrades to a hard step at `edge0`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return step(edge0, x);
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// GLSL-style step: 0 below `edge`, 1 at or above.
#[inline]
pub fn step(edge: f32, x: f32) -> f32 {
    if x < edge { 0.0 } else { 1.0 }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Normalize, or return `(1, 0)` for (near-)zero input. Never yields NaN for
/// finite input.
#[inline]
pub fn safe_normalize2(v: Vec2) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq < DEGENERATE_LENGTH_SQ || !len_sq.is_finite() {
        Vec2::X
    } else {
        v / len_sq.sqrt()
    }
}

/// 3D variant of [`safe_normalize2`] with a caller-chosen fallback.
#[inline]
pub fn safe_normalize3(v: Vec3, fallback: Vec3) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq < DEGENERATE_LENGTH_SQ || !len_sq.is_finite() {
        fallback
    } else {
        v / len_sq.sqrt()
    }
}

/// Wrap an angle into `[-π, π]` through `atan2(sin, cos)`.
#[inline]
pub fn wrap_angle(a: f32) -> f32 {
    a.sin().atan2(a.cos())
}

/// Shortest signed difference `to - from`, in `[-π, π]`.
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    let d = to - from;
    d.sin().atan2(d.cos())
}

/// Map an angle in `[-π, π]` to `[0, 1]`.
#[inline]
pub fn angle_to_unit(a: f32) -> f32 {
    ((wrap_angle(a) + PI) / TAU).clamp(0.0, 1.0)
}

/// Inverse of [`angle_to_unit`].
#[inline]
pub fn unit_to_angle(u: f32) -> f32 {
    u * TAU - PI
}

/// Rotation about +Y that turns blade-local +Z onto the horizontal direction
/// `(cos θ, 0, sin θ)`.
#[inline]
pub fn yaw_rotation(facing: f32) -> Quat {
    Quat::from_rotation_y(FRAC_PI_2 - facing)
}

/// Horizontal direction for a facing angle, as an XZ vector.
#[inline]
pub fn facing_direction(facing: f32) -> Vec2 {
    Vec2::new(facing.cos(), facing.sin())
}

/// Rotation carrying world up onto `normal`, or `None` on (near-)flat ground
/// where the rotation axis degenerates.
pub fn slope_alignment(normal: Vec3) -> Option<Quat> {
    let n = safe_normalize3(normal, Vec3::Y);
    let axis = Vec3::Y.cross(n);
    let axis_len = axis.length();
    if axis_len < 1e-4 {
        return None;
    }
    let angle = Vec3::Y.dot(n).clamp(-1.0, 1.0).acos();
    Some(Quat::from_axis_angle(axis / axis_len, angle))
}

/// A point in patch object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ObjectPoint(pub Vec3);

/// A point in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldPoint(pub Vec3);

impl ObjectPoint {
    pub fn xz(self) -> Vec2 {
        Vec2::new(self.0.x, self.0.z)
    }
}

impl WorldPoint {
    pub fn xz(self) -> Vec2 {
        Vec2::new(self.0.x, self.0.z)
    }

    pub fn distance(self, other: WorldPoint) -> f32 {
        self.0.distance(other.0)
    }
}

/// Object↔world transform of a grass patch. Patches are axis-aligned and
/// unscaled, so this is a pure translation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PatchTransform {
    pub origin: Vec3,
}

impl PatchTransform {
    pub fn new(origin: Vec3) -> Self {
        Self { origin }
    }

    #[inline]
    pub fn to_world(&self, p: ObjectPoint) -> WorldPoint {
        WorldPoint(p.0 + self.origin)
    }

    #[inline]
    pub fn to_object(&self, p: WorldPoint) -> ObjectPoint {
        ObjectPoint(p.0 - self.origin)
    }
}
