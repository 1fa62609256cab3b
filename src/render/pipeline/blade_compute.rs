//! Blade parameter synthesis compute pipeline

use crate::render::buffer::{BladeBuffers, FrameBuffer};

/// Invocations per workgroup. Must match `@workgroup_size` in blade_compute.wgsl.
pub const WORKGROUP_SIZE: u32 = 64;

/// Workgroups needed to cover `blade_count` blades.
pub fn workgroup_count(blade_count: u32) -> u32 {
    blade_count.div_ceil(WORKGROUP_SIZE)
}

/// One invocation per blade, writing that blade's record and nothing else.
pub struct BladeComputePipeline {
    pipeline: wgpu::ComputePipeline,
}

impl BladeComputePipeline {
    pub fn new(device: &wgpu::Device, frame: &FrameBuffer, blades: &BladeBuffers) -> Self {
        let source = format!(
            "{}\n{}",
            include_str!("../../../shaders/grass_common.wgsl"),
            include_str!("../../../shaders/blade_compute.wgsl")
        );
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blade_compute_shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blade_compute_pipeline_layout"),
            bind_group_layouts: &[frame.bind_group_layout(), blades.compute_layout()],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("blade_compute_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        log::debug!("Blade compute pipeline created");
        Self { pipeline }
    }

    /// Record the synthesis pass. Anything encoded after this in the same
    /// encoder sees the finished records.
    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder, frame: &FrameBuffer, blades: &BladeBuffers) {
        let groups = workgroup_count(blades.blade_count());
        if groups == 0 {
            return;
        }

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("blade_compute_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, frame.bind_group(), &[]);
        pass.set_bind_group(1, blades.compute_bind_group(), &[]);
        pass.dispatch_workgroups(groups, 1, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workgroup_count() {
        assert_eq!(workgroup_count(0), 0);
        assert_eq!(workgroup_count(1), 1);
        assert_eq!(workgroup_count(64), 1);
        assert_eq!(workgroup_count(65), 2);
        assert_eq!(workgroup_count(64 * 64), 64);
    }
}
