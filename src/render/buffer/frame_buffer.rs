//! GPU uniforms for per-frame data: camera, light and grass params

use bytemuck::{Pod, Zeroable};

use crate::grass::{FrameContext, GrassParams};

/// Frame uniform data for GPU (must match `FrameUniform` in grass_common.wgsl)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniform {
    /// View-projection matrix (64 bytes, offset 0)
    pub view_proj: [[f32; 4]; 4],
    /// Camera position in world space (12 bytes, offset 64)
    pub camera_position: [f32; 3],
    /// Elapsed simulation time (4 bytes, offset 76)
    pub time: f32,
    /// Direction toward the light (12 bytes, offset 80)
    pub light_direction: [f32; 3],
    pub _pad0: f32,
    /// Light color (12 bytes, offset 96)
    pub light_color: [f32; 3],
    pub _pad1: f32,
}

impl FrameUniform {
    pub fn from_frame(frame: &FrameContext) -> Self {
        Self {
            view_proj: frame.view_proj.to_cols_array_2d(),
            camera_position: frame.camera_position.to_array(),
            time: frame.time,
            light_direction: frame.light_direction.to_array(),
            _pad0: 0.0,
            light_color: frame.light_color.to_array(),
            _pad1: 0.0,
        }
    }
}

/// Uniform buffers for bind group 0, shared by the compute and render pipelines
pub struct FrameBuffer {
    frame_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl FrameBuffer {
    pub fn new(device: &wgpu::Device) -> Self {
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniform"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("grass_params"),
            size: std::mem::size_of::<GrassParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE | wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            frame_buffer,
            params_buffer,
            bind_group_layout,
            bind_group,
        }
    }

    /// Upload this frame's uniforms. Call between frames only.
    pub fn update(&self, queue: &wgpu::Queue, frame: &FrameContext, params: &GrassParams) {
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&FrameUniform::from_frame(frame)));
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(params));
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::{Camera, DirectionalLight};

    #[test]
    fn test_frame_uniform_size() {
        assert_eq!(std::mem::size_of::<FrameUniform>(), 112);
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
        assert_eq!(std::mem::offset_of!(FrameUniform, light_direction), 80);
    }

    #[test]
    fn test_from_frame() {
        let camera = Camera::default();
        let frame = FrameContext::new(&camera, &DirectionalLight::default(), 3.5);
        let uniform = FrameUniform::from_frame(&frame);
        assert_eq!(uniform.time, 3.5);
        assert_eq!(uniform.camera_position, camera.position.to_array());
        assert_eq!(uniform.view_proj, camera.view_projection().to_cols_array_2d());
    }
}
