//! Instanced blade render pipeline and its offscreen target

use wgpu::{Device, Extent3d, TextureView};

use crate::grass::BladeTemplate;
use crate::render::buffer::{BladeBuffers, FrameBuffer};

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Color + depth textures for headless rendering.
pub struct RenderTarget {
    #[allow(dead_code)]
    color: wgpu::Texture,
    #[allow(dead_code)]
    depth: wgpu::Texture,
    color_view: TextureView,
    depth_view: TextureView,
    width: u32,
    height: u32,
}

impl RenderTarget {
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let size = Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = |label, format| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            })
        };
        let color = texture("grass_color", COLOR_FORMAT);
        let depth = texture("grass_depth", DEPTH_FORMAT);
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            color,
            depth,
            color_view,
            depth_view,
            width: size.width,
            height: size.height,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn color_view(&self) -> &TextureView {
        &self.color_view
    }

    pub fn depth_view(&self) -> &TextureView {
        &self.depth_view
    }
}

/// Draws every blade as an instance of the template strip. The vertex stage
/// reads the blade's record from storage and shapes the vertex.
pub struct BladeRenderPipeline {
    pipeline: wgpu::RenderPipeline,
}

impl BladeRenderPipeline {
    pub fn new(device: &Device, frame: &FrameBuffer, blades: &BladeBuffers) -> Self {
        let source = format!(
            "{}\n{}",
            include_str!("../../../shaders/grass_common.wgsl"),
            include_str!("../../../shaders/blade_render.wgsl")
        );
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blade_render_shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blade_render_pipeline_layout"),
            bind_group_layouts: &[frame.bind_group_layout(), blades.render_layout()],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blade_render_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[BladeTemplate::vertex_layout()],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Blades are visible from both sides
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("Blade render pipeline created");
        Self { pipeline }
    }

    /// Draw all blades into `target`, clearing it first.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &RenderTarget,
        frame: &FrameBuffer,
        blades: &BladeBuffers,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("blade_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r: 0.45, g: 0.6, b: 0.8, a: 1.0 }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if blades.blade_count() == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, frame.bind_group(), &[]);
        pass.set_bind_group(1, blades.render_bind_group(), &[]);
        pass.set_vertex_buffer(0, blades.vertex_buffer().slice(..));
        pass.set_index_buffer(blades.index_buffer().slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..blades.index_count(), 0, 0..blades.blade_count());
    }
}
