//! Procedural grass: per-blade parameter synthesis and blade shaping.
//!
//! A patch of blade instances is laid out once. Every frame each blade's
//! record is re-derived from its world position, the config snapshot and the
//! clock, then consumed by the shaping stage. Nothing carries over between
//! frames.

pub mod clump;
pub mod config;
pub mod lod;
pub mod params;
pub mod patch;
pub mod profile;
pub mod record;
pub mod shading;
pub mod shaper;
pub mod synth;
pub mod template;
pub mod wind;

pub use config::GrassConfig;
pub use params::GrassParams;
pub use patch::{BladeInstance, Patch};
pub use profile::{BladeProfile, BladeType};
pub use record::{BladeRecord, GpuBladeRecord};
pub use template::{BladeTemplate, TemplateVertex};

use glam::{Mat4, Vec3};
use rayon::prelude::*;

use crate::core::camera::{Camera, DirectionalLight};
use crate::core::time::SimClock;
use crate::math::frame::safe_normalize3;
use crate::math::noise::NoiseField;
use crate::terrain::TerrainSampler;
use shading::{blade_color, shading_normal, NormalInputs};
use shaper::BladeShaper;
use synth::BladeSynthesizer;

/// Per-frame inputs from the host: clock, camera and light.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    pub time: f32,
    pub camera_position: Vec3,
    pub view_proj: Mat4,
    pub light_direction: Vec3,
    pub light_color: Vec3,
}

impl FrameContext {
    pub fn new(camera: &Camera, light: &DirectionalLight, time: f32) -> Self {
        Self {
            time,
            camera_position: camera.position,
            view_proj: camera.view_projection(),
            light_direction: light.direction,
            light_color: light.color,
        }
    }

    pub fn from_clock(camera: &Camera, light: &DirectionalLight, clock: &SimClock) -> Self {
        Self::new(camera, light, clock.elapsed_secs())
    }

    pub fn light(&self) -> DirectionalLight {
        DirectionalLight::new(self.light_direction, self.light_color)
    }
}

/// CPU-shaped grass for one frame. Culled blades contribute no geometry.
#[derive(Clone, Debug, Default)]
pub struct GrassMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub visible_blades: usize,
}

impl GrassMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

struct BladeVertices {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    colors: Vec<Vec3>,
}

/// Owns the config snapshot, blade layout, noise and template, and runs
/// both pipeline stages on the CPU.
pub struct GrassSystem {
    config: GrassConfig,
    patch: Patch,
    noise: NoiseField,
    template: BladeTemplate,
}

impl GrassSystem {
    pub fn new(config: GrassConfig) -> Self {
        let patch = Patch::new(&config.patch);
        let noise = NoiseField::new(config.seed);
        let template = BladeTemplate::new(config.segments);
        log::info!(
            "Grass system ready: {} blades, {} segments per blade",
            patch.len(),
            template.segments()
        );
        Self { config, patch, noise, template }
    }

    pub fn config(&self) -> &GrassConfig {
        &self.config
    }

    /// Read-only snapshot consumed by one frame.
    pub fn frame_snapshot(&self) -> &GrassConfig {
        &self.config
    }

    /// Replace the config between frames. Returns true when the blade layout
    /// was reallocated.
    pub fn set_config(&mut self, config: GrassConfig) -> bool {
        let mut reallocated = false;
        if config.layout_differs(&self.config) {
            reallocated = self.patch.reconfigure(&config.patch);
            if reallocated {
                log::info!("Grass patch reallocated: {} blades", self.patch.len());
            }
        }
        if config.seed != self.config.seed {
            log::debug!("Grass noise reseeded: {} -> {}", self.config.seed, config.seed);
            self.noise = NoiseField::new(config.seed);
        }
        if config.segments != self.config.segments {
            self.template = BladeTemplate::new(config.segments);
        }
        self.config = config;
        reallocated
    }

    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    pub fn template(&self) -> &BladeTemplate {
        &self.template
    }

    pub fn synthesizer(&self) -> BladeSynthesizer<'_> {
        BladeSynthesizer::new(&self.config, &self.noise, *self.patch.transform())
    }

    pub fn shaper(&self) -> BladeShaper<'_> {
        BladeShaper::new(&self.config, *self.patch.transform())
    }

    /// Synthesize every blade's record for `time`, one task per blade.
    pub fn synthesize(&self, time: f32) -> Vec<BladeRecord> {
        let synth = self.synthesizer();
        self.patch
            .instances()
            .par_iter()
            .map(|blade| synth.synthesize(blade, time))
            .collect()
    }

    /// Shape and shade every surviving blade into one mesh.
    pub fn shape_frame(
        &self,
        records: &[BladeRecord],
        frame: &FrameContext,
        terrain: &dyn TerrainSampler,
    ) -> GrassMesh {
        if records.len() != self.patch.len() {
            log::warn!(
                "Shaping {} records against {} blades; only the first {} blades are shaped",
                records.len(),
                self.patch.len(),
                records.len().min(self.patch.len())
            );
        }

        let shaper = self.shaper();
        let light = frame.light();
        let cone_strength = self.config.clump.cone_strength;
        let template = &self.template;

        let blades: Vec<BladeVertices> = self
            .patch
            .instances()
            .par_iter()
            .zip(records.par_iter())
            .filter_map(|(blade, record)| {
                let prepared = shaper.prepare(blade, record, frame, terrain);
                if !prepared.visible() {
                    return None;
                }
                let count = template.vertex_count();
                let mut out = BladeVertices {
                    positions: Vec::with_capacity(count),
                    normals: Vec::with_capacity(count),
                    colors: Vec::with_capacity(count),
                };
                for tv in template.vertices() {
                    let v = prepared.vertex(tv.row, tv.side);
                    let view_dir = safe_normalize3(frame.camera_position - v.position.0, Vec3::Y);
                    let normal = shading_normal(
                        &NormalInputs {
                            geometric: v.normal,
                            to_center: record.to_center,
                            t: v.t,
                            camera_distance: prepared.camera_distance,
                            cull_weight: prepared.cull.weight,
                            view_dir,
                        },
                        cone_strength,
                    );
                    out.positions.push(v.position.0);
                    out.normals.push(normal);
                    out.colors.push(blade_color(record, v.t, normal, view_dir, &light, &self.config.color));
                }
                Some(out)
            })
            .collect();

        let mut mesh = GrassMesh {
            visible_blades: blades.len(),
            ..Default::default()
        };
        let per_blade = template.vertex_count();
        mesh.positions.reserve(blades.len() * per_blade);
        mesh.indices.reserve(blades.len() * template.indices().len());
        for blade in blades {
            let base = mesh.positions.len() as u32;
            mesh.indices.extend(template.indices().iter().map(|&i| base + i as u32));
            mesh.positions.extend(blade.positions);
            mesh.normals.extend(blade.normals);
            mesh.colors.extend(blade.colors);
        }
        mesh
    }

    /// GPU uniform for this frame.
    pub fn build_params(&self, frame: &FrameContext) -> GrassParams {
        GrassParams::from_config(&self.config, frame.time, self.patch.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grass::clump::{clump_center, nearest_clump};
    use crate::math::frame::{angle_to_unit, yaw_rotation, ObjectPoint};
    use crate::terrain::PlaneTerrain;

    fn meadow_config() -> GrassConfig {
        let mut config = GrassConfig::default();
        config.patch.grid_size = 64;
        config.patch.patch_size = 8.0;
        config.clump.clump_size = 0.8;
        config.clump.clump_radius = 1.5;
        config
    }

    fn frame(camera: Vec3, time: f32) -> FrameContext {
        let camera = Camera::look_at(camera, Vec3::ZERO, Vec3::Y);
        FrameContext::new(&camera, &DirectionalLight::default(), time)
    }

    #[test]
    fn test_windless_field_facing_and_tips() {
        let mut config = meadow_config();
        config.wind.strength = 0.0;
        let system = GrassSystem::new(config);
        assert_eq!(system.patch().len(), 64 * 64);

        let records = system.synthesize(7.5);
        let synth = system.synthesizer();
        let shaper = system.shaper();
        let terrain = PlaneTerrain::flat(0.0);
        let frame = frame(Vec3::new(0.0, 3.0, 10.0), 7.5);
        let segments = system.config().segments;

        for (blade, record) in system.patch().instances().iter().zip(&records) {
            let xz = blade.position.xz();
            let clump = nearest_clump(xz, 0.8);
            let base = synth.clump_base(clump.cell_id);
            let expected = synth.base_facing(&clump, &base, record.per_blade_hash);
            assert_eq!(record.facing01, angle_to_unit(expected));
            assert_eq!(record.wind_strength, 0.0);

            let prepared = shaper.prepare(blade, record, &frame, &terrain);
            let tip = prepared.vertex(segments, 0.0).position.0;
            let expected_tip =
                yaw_rotation(record.facing_angle()) * Vec3::new(0.0, record.height, 0.0) + blade.position.0;
            assert!((tip - expected_tip).length() < 1e-4, "tip {:?} vs {:?}", tip, expected_tip);
        }
    }

    #[test]
    fn test_blade_on_seed_has_full_presence() {
        let system = GrassSystem::new(meadow_config());
        let synth = system.synthesizer();
        let center = clump_center(glam::IVec2::new(1, 2), 0.8);
        let blade = BladeInstance { position: ObjectPoint(Vec3::new(center.x, 0.0, center.y)), index: 3 };
        let sample = nearest_clump(center, 0.8);
        assert!(sample.distance_to_center < 1e-4);
        let record = synth.synthesize(&blade, 0.0);
        assert!((record.presence - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_synthesis_is_repeatable() {
        let system = GrassSystem::new(meadow_config());
        assert_eq!(system.synthesize(12.25), system.synthesize(12.25));
        let other = GrassSystem::new(meadow_config());
        assert_eq!(system.synthesize(3.0), other.synthesize(3.0));
    }

    #[test]
    fn test_shape_frame_mesh_is_consistent() {
        let mut config = meadow_config();
        config.patch.grid_size = 16;
        let system = GrassSystem::new(config);
        let records = system.synthesize(1.0);
        let mesh = system.shape_frame(&records, &frame(Vec3::new(0.0, 2.0, 6.0), 1.0), &PlaneTerrain::flat(0.0));

        let per_blade = system.template().vertex_count();
        assert!(mesh.visible_blades > 0);
        assert!(mesh.visible_blades <= system.patch().len());
        assert_eq!(mesh.vertex_count(), mesh.visible_blades * per_blade);
        assert_eq!(mesh.normals.len(), mesh.vertex_count());
        assert_eq!(mesh.colors.len(), mesh.vertex_count());
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
        assert!(mesh.positions.iter().all(|p| p.is_finite()));
        assert!(mesh.normals.iter().all(|n| (n.length() - 1.0).abs() < 1e-3));
    }

    #[test]
    fn test_distant_camera_thins_field() {
        let mut config = meadow_config();
        config.patch.grid_size = 24;
        let system = GrassSystem::new(config);
        let records = system.synthesize(0.0);
        let terrain = PlaneTerrain::flat(0.0);
        let near = system.shape_frame(&records, &frame(Vec3::new(0.0, 2.0, 5.0), 0.0), &terrain);
        let mid = system.shape_frame(&records, &frame(Vec3::new(0.0, 2.0, 25.0), 0.0), &terrain);
        let far = system.shape_frame(&records, &frame(Vec3::new(0.0, 2.0, 60.0), 0.0), &terrain);
        assert!(mid.visible_blades < near.visible_blades);
        assert_eq!(far.visible_blades, 0);
        assert!(far.indices.is_empty());
    }

    #[test]
    fn test_distant_survivors_keep_unbiased_yaw() {
        let system = GrassSystem::new(meadow_config());
        let records = system.synthesize(0.0);
        let shaper = system.shaper();
        let terrain = PlaneTerrain::flat(0.0);
        let frame = frame(Vec3::new(0.0, 2.0, 24.0), 0.0);

        let (mut negative, mut positive) = (0usize, 0usize);
        for (blade, record) in system.patch().instances().iter().zip(&records) {
            if !shaper.prepare(blade, record, &frame, &terrain).visible() {
                continue;
            }
            // Sign of the random yaw term (per_blade_hash - 0.5) * TAU
            if record.per_blade_hash < 0.5 {
                negative += 1;
            } else {
                positive += 1;
            }
        }
        let survivors = negative + positive;
        assert!(survivors > 0 && survivors < records.len());
        assert!(negative * 3 >= survivors, "{} negative of {}", negative, survivors);
        assert!(positive * 3 >= survivors, "{} positive of {}", positive, survivors);
    }

    #[test]
    fn test_short_record_slice_shapes_prefix() {
        let mut config = meadow_config();
        config.patch.grid_size = 8;
        let system = GrassSystem::new(config);
        let records = system.synthesize(0.0);
        let frame = frame(Vec3::new(0.0, 2.0, 6.0), 0.0);
        let terrain = PlaneTerrain::flat(0.0);
        let mesh = system.shape_frame(&records[..10], &frame, &terrain);
        assert!(mesh.visible_blades <= 10);
    }

    #[test]
    fn test_set_config() {
        let mut system = GrassSystem::new(meadow_config());
        let mut next = system.config().clone();
        next.wind.speed = 4.0;
        assert!(!system.set_config(next.clone()));
        assert_eq!(system.frame_snapshot().wind.speed, 4.0);

        next.patch.grid_size = 8;
        next.segments = 4;
        assert!(system.set_config(next.clone()));
        assert_eq!(system.patch().len(), 64);
        assert_eq!(system.template().segments(), 4);

        next.seed = 99;
        system.set_config(next);
        assert_eq!(system.noise().seed(), 99);
    }

    #[test]
    fn test_build_params() {
        let system = GrassSystem::new(meadow_config());
        let params = system.build_params(&frame(Vec3::new(0.0, 2.0, 6.0), 4.0));
        assert_eq!(params.time, 4.0);
        assert_eq!(params.blade_count, 4096);
        assert_eq!(params.clump_size, 0.8);
    }
}
