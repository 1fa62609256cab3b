//! GPU path: synthesis in a compute pass, shaping in the vertex stage.

pub mod buffer;
pub mod context;
pub mod pipeline;

pub use context::GpuContext;

use crate::core::error::Error;
use crate::grass::{BladeRecord, FrameContext, GrassSystem};
use crate::terrain::TerrainSampler;
use buffer::{BladeBuffers, FrameBuffer};
use pipeline::{BladeComputePipeline, BladeRenderPipeline, RenderTarget};

/// GPU resources for one grass patch.
pub struct GrassRenderer {
    frame: FrameBuffer,
    blades: BladeBuffers,
    compute: BladeComputePipeline,
    render: BladeRenderPipeline,
    target: RenderTarget,
}

impl GrassRenderer {
    pub fn new(
        ctx: &GpuContext,
        system: &GrassSystem,
        terrain: &dyn TerrainSampler,
        width: u32,
        height: u32,
    ) -> Self {
        let frame = FrameBuffer::new(&ctx.device);
        let blades = BladeBuffers::new(&ctx.device, system.patch(), system.template(), terrain);
        let compute = BladeComputePipeline::new(&ctx.device, &frame, &blades);
        let render = BladeRenderPipeline::new(&ctx.device, &frame, &blades);
        let target = RenderTarget::new(&ctx.device, width, height);
        log::info!(
            "Grass renderer ready: {} blades, {}x{} target",
            blades.blade_count(),
            width,
            height
        );
        Self { frame, blades, compute, render, target }
    }

    /// Rebuild the blade buffers after the patch layout or template changed.
    pub fn rebuild_blades(&mut self, ctx: &GpuContext, system: &GrassSystem, terrain: &dyn TerrainSampler) {
        self.blades = BladeBuffers::new(&ctx.device, system.patch(), system.template(), terrain);
        self.compute = BladeComputePipeline::new(&ctx.device, &self.frame, &self.blades);
        self.render = BladeRenderPipeline::new(&ctx.device, &self.frame, &self.blades);
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    pub fn blades(&self) -> &BladeBuffers {
        &self.blades
    }

    /// Upload uniforms and submit one synthesize-then-draw frame.
    pub fn render_frame(&self, ctx: &GpuContext, system: &GrassSystem, frame: &FrameContext) {
        self.frame.update(&ctx.queue, frame, &system.build_params(frame));
        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("grass_frame"),
        });
        self.compute.dispatch(&mut encoder, &self.frame, &self.blades);
        self.render.render(&mut encoder, &self.target, &self.frame, &self.blades);
        ctx.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Run only the synthesis pass and read the records back.
    pub fn synthesize(
        &self,
        ctx: &GpuContext,
        system: &GrassSystem,
        frame: &FrameContext,
    ) -> Result<Vec<BladeRecord>, Error> {
        self.frame.update(&ctx.queue, frame, &system.build_params(frame));
        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("grass_synthesis"),
        });
        self.compute.dispatch(&mut encoder, &self.frame, &self.blades);
        ctx.queue.submit(std::iter::once(encoder.finish()));

        let records = self.blades.read_records(&ctx.device, &ctx.queue)?;
        Ok(records.iter().map(BladeRecord::from_gpu).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::{Camera, DirectionalLight};
    use crate::grass::GrassConfig;
    use crate::terrain::PlaneTerrain;
    use glam::Vec3;

    fn hash_fields_match(cpu: &BladeRecord, gpu: &BladeRecord) -> bool {
        let eps = 1e-3;
        (cpu.height - gpu.height).abs() < eps
            && (cpu.width - gpu.width).abs() < eps
            && (cpu.bend - gpu.bend).abs() < eps
            && (cpu.presence - gpu.presence).abs() < eps
            && (cpu.clump_seed - gpu.clump_seed).abs() < eps
            && (cpu.per_blade_hash - gpu.per_blade_hash).abs() < eps
            && (cpu.lod_seed - gpu.lod_seed).abs() < eps
            && (cpu.to_center - gpu.to_center).abs().max_element() < eps
    }

    #[test]
    fn test_gpu_synthesis_matches_cpu_hash_fields() {
        // No adapter on this machine
        let Ok(ctx) = GpuContext::new_headless_blocking() else {
            return;
        };

        let mut config = GrassConfig::default();
        config.patch.grid_size = 16;
        config.patch.patch_size = 2.0;
        let system = GrassSystem::new(config);
        let terrain = PlaneTerrain::flat(0.0);
        let camera = Camera::look_at(Vec3::new(0.0, 2.0, 6.0), Vec3::ZERO, Vec3::Y);
        let frame = FrameContext::new(&camera, &DirectionalLight::default(), 1.25);

        // Building the renderer compiles and validates both pipelines
        let renderer = GrassRenderer::new(&ctx, &system, &terrain, 64, 64);
        let gpu = renderer.synthesize(&ctx, &system, &frame).unwrap();
        let cpu = system.synthesize(frame.time);
        assert_eq!(gpu.len(), cpu.len());

        for r in &gpu {
            assert!(r.height > 0.0 && r.width > 0.0);
            assert!((0.0..=1.0).contains(&r.presence));
            assert!((0.0..1.0).contains(&r.per_blade_hash));
            assert!((0.0..1.0).contains(&r.lod_seed));
            assert!((0.0..=1.0).contains(&r.wind_strength));
            assert!((0.0..=1.0).contains(&r.facing01));
        }

        // sin-based hashes can drift by an ulp on some drivers
        let matching = cpu.iter().zip(&gpu).filter(|(c, g)| hash_fields_match(c, g)).count();
        assert!(matching * 10 >= cpu.len() * 9, "{} of {} blades match", matching, cpu.len());

        renderer.render_frame(&ctx, &system, &frame);
        ctx.wait_idle().unwrap();
    }
}
