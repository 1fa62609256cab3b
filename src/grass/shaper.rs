//! Per-vertex blade shaping.
//!
//! CPU twin of the vertex stage in `shaders/blade_render.wgsl`. Blade-level
//! work (terrain queries, wind, cull, rotations) is done once in
//! [`BladeShaper::prepare`]; [`PreparedBlade::vertex`] is the per-vertex part.

use glam::{Quat, Vec2, Vec3, Vec4};

use crate::grass::config::GrassConfig;
use crate::grass::lod::{cull, folded_t, lod_weight, CullResult};
use crate::grass::patch::BladeInstance;
use crate::grass::record::BladeRecord;
use crate::grass::wind::{WindInput, WindModel};
use crate::grass::FrameContext;
use crate::math::bezier::CubicBezier;
use crate::math::frame::{
    safe_normalize3, slope_alignment, yaw_rotation, ObjectPoint, PatchTransform, WorldPoint,
    DEGENERATE_LENGTH_SQ,
};
use crate::terrain::TerrainSampler;

/// A shaped vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapedVertex {
    pub position: WorldPoint,
    /// Geometric normal, world space.
    pub normal: Vec3,
    pub clip: Vec4,
    /// Unfolded position along the blade.
    pub t: f32,
    pub side: f32,
}

/// Everything about a blade that does not vary per vertex.
#[derive(Clone, Debug)]
pub struct PreparedBlade {
    /// Ground point under the root (object-space root plus terrain height).
    pub root: WorldPoint,
    pub curve: CubicBezier,
    pub facing: f32,
    pub rotation: Quat,
    pub camera_distance: f32,
    pub lod_weight: f32,
    pub cull: CullResult,
    pub width: f32,
    pub segments: u32,
    pub base_width: f32,
    pub tip_thin: f32,
    pub view_thicken: f32,
    pub camera_position: Vec3,
    pub view_proj: glam::Mat4,
}

/// Stable side/normal pair for a spine tangent. Reference axis is blade-local
/// X, switching to Z when the tangent runs nearly parallel to it.
pub fn tangent_frame(tangent: Vec3) -> (Vec3, Vec3) {
    let mut normal = Vec3::X.cross(tangent);
    if normal.length_squared() < DEGENERATE_LENGTH_SQ {
        normal = Vec3::Z.cross(tangent);
    }
    let normal = safe_normalize3(normal, Vec3::Z);
    let side = safe_normalize3(tangent.cross(normal), Vec3::X);
    (side, normal)
}

/// Width taper: `(t + base_width) * (1 - t)^tip_thin`. Zero at the tip.
pub fn width_taper(t: f32, base_width: f32, tip_thin: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    (t + base_width) * (1.0 - t).powf(tip_thin.max(1e-4))
}

/// Height-based mask for the view-dependent edge tilt. Zero at root and tip.
pub fn edge_tilt_mask(t: f32, side: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    side.abs().min(1.0) * 4.0 * t * (1.0 - t)
}

pub struct BladeShaper<'a> {
    config: &'a GrassConfig,
    wind: WindModel<'a>,
    transform: PatchTransform,
}

impl<'a> BladeShaper<'a> {
    pub fn new(config: &'a GrassConfig, transform: PatchTransform) -> Self {
        Self { config, wind: WindModel::new(&config.wind), transform }
    }

    pub fn prepare(
        &self,
        instance: &BladeInstance,
        record: &BladeRecord,
        frame: &FrameContext,
        terrain: &dyn TerrainSampler,
    ) -> PreparedBlade {
        let root_world = self.transform.to_world(instance.position);
        let xz = root_world.xz();
        let ground = terrain.height(xz);
        let root = self.transform.to_world(ObjectPoint(instance.position.0 + Vec3::Y * ground));
        let camera_distance = root.0.distance(frame.camera_position);

        let facing = record.facing_angle();
        let mut curve = record.blade_type().control_points(record.height, record.bend);
        let wind_input = WindInput {
            world_xz: xz,
            height: record.height,
            strength: record.wind_strength,
            per_blade_hash: record.per_blade_hash,
            time: frame.time,
        };
        self.wind.deform(&mut curve, &wind_input, facing, self.wind.distance_falloff(camera_distance));

        let yaw = yaw_rotation(facing);
        let rotation = match slope_alignment(terrain.normal(xz)) {
            Some(slope) => slope * yaw,
            None => yaw,
        };

        let shape = &self.config.shape;
        PreparedBlade {
            root,
            curve,
            facing,
            rotation,
            camera_distance,
            lod_weight: lod_weight(camera_distance, &self.config.lod),
            cull: cull(record.lod_seed, record.presence, camera_distance, &self.config.cull),
            width: record.width,
            segments: self.config.segments.max(1),
            base_width: shape.base_width,
            tip_thin: shape.tip_thin,
            view_thicken: shape.view_thicken,
            camera_position: frame.camera_position,
            view_proj: frame.view_proj,
        }
    }
}

impl PreparedBlade {
    /// Shape the vertex at template `row` on `side` (`s` in `[-1, 1]`).
    pub fn vertex(&self, row: u32, side: f32) -> ShapedVertex {
        let t = (row as f32 / self.segments as f32).min(1.0);
        let t_pos = folded_t(row, self.segments, self.lod_weight);

        let spine = self.curve.eval(t_pos);
        let (side_axis, local_normal) = tangent_frame(self.curve.tangent(t_pos));

        let half_width = 0.5
            * self.width
            * width_taper(t, self.base_width, self.tip_thin)
            * self.cull.width_scale
            * self.cull.final_presence;
        let local = spine + side_axis * (half_width * side);

        let mut position = self.root.0 + self.rotation * local;
        let normal = self.rotation * local_normal;

        // Edge tilt toward the camera at grazing angles.
        let to_camera = safe_normalize3(self.camera_position - position, Vec3::Y);
        let facing_camera = if normal.dot(to_camera) >= 0.0 { normal } else { -normal };
        let grazing = 1.0 - normal.dot(to_camera).abs();
        let tilt = grazing * self.view_thicken * edge_tilt_mask(t, side) * half_width;
        position += facing_camera * tilt;

        ShapedVertex {
            position: WorldPoint(position),
            normal,
            clip: self.view_proj * position.extend(1.0),
            t,
            side,
        }
    }

    /// World position of the blade's spine at the tip.
    pub fn tip(&self) -> Vec3 {
        self.root.0 + self.rotation * self.curve.eval(1.0)
    }

    pub fn visible(&self) -> bool {
        self.cull.survives && self.cull.final_presence > 0.0
    }

    /// Horizontal root position.
    pub fn root_xz(&self) -> Vec2 {
        self.root.xz()
    }
}
