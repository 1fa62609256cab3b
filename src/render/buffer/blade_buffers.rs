//! Per-blade GPU storage: instances, records, template mesh and readback

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::core::error::Error;
use crate::grass::{BladeTemplate, GpuBladeRecord, Patch};
use crate::terrain::TerrainSampler;

/// One blade instance as seen by the shaders (32 bytes).
/// Must match `BladeInstance` in grass_common.wgsl.
///
/// Terrain height and normal are baked once per patch.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuBladeInstance {
    /// Root in patch object space
    pub position: [f32; 3],
    pub index: u32,
    // -- 16 bytes --
    pub terrain_normal: [f32; 3],
    pub terrain_height: f32,
    // -- 16 bytes --
}

/// Bake a patch's instances against a terrain.
pub fn pack_instances(patch: &Patch, terrain: &dyn TerrainSampler) -> Vec<GpuBladeInstance> {
    let transform = patch.transform();
    patch
        .instances()
        .iter()
        .map(|blade| {
            let xz = transform.to_world(blade.position).xz();
            GpuBladeInstance {
                position: blade.position.0.to_array(),
                index: blade.index,
                terrain_normal: terrain.normal(xz).to_array(),
                terrain_height: terrain.height(xz),
            }
        })
        .collect()
}

/// Storage buffers for one patch plus the shared template mesh.
pub struct BladeBuffers {
    instance_buffer: wgpu::Buffer,
    record_buffer: wgpu::Buffer,
    staging_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    blade_count: u32,
    compute_layout: wgpu::BindGroupLayout,
    compute_bind_group: wgpu::BindGroup,
    render_layout: wgpu::BindGroupLayout,
    render_bind_group: wgpu::BindGroup,
}

fn storage_entry(binding: u32, visibility: wgpu::ShaderStages, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl BladeBuffers {
    pub fn new(
        device: &wgpu::Device,
        patch: &Patch,
        template: &BladeTemplate,
        terrain: &dyn TerrainSampler,
    ) -> Self {
        let instances = pack_instances(patch, terrain);
        let blade_count = instances.len() as u32;
        // Zero-sized storage bindings are invalid; keep one slot for an empty patch.
        let record_count = instances.len().max(1) as u64;
        let record_size = record_count * std::mem::size_of::<GpuBladeRecord>() as u64;

        let empty = GpuBladeInstance::zeroed();
        let instance_bytes: &[u8] = if instances.is_empty() {
            bytemuck::bytes_of(&empty)
        } else {
            bytemuck::cast_slice(&instances)
        };
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blade_instances"),
            contents: instance_bytes,
            usage: wgpu::BufferUsages::STORAGE,
        });

        let record_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("blade_records"),
            size: record_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("blade_records_staging"),
            size: record_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blade_template_vertices"),
            contents: bytemuck::cast_slice(template.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // u16 index data must be padded to a 4-byte multiple.
        let mut indices = template.indices().to_vec();
        if indices.len() % 2 == 1 {
            indices.push(0);
        }
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blade_template_indices"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let compute_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blade_compute_layout"),
            entries: &[
                storage_entry(0, wgpu::ShaderStages::COMPUTE, true),
                storage_entry(1, wgpu::ShaderStages::COMPUTE, false),
            ],
        });

        let render_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blade_render_layout"),
            entries: &[
                storage_entry(0, wgpu::ShaderStages::VERTEX, true),
                storage_entry(1, wgpu::ShaderStages::VERTEX, true),
            ],
        });

        let bind = |label, layout: &wgpu::BindGroupLayout| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: instance_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: record_buffer.as_entire_binding(),
                    },
                ],
            })
        };
        let compute_bind_group = bind("blade_compute_bind_group", &compute_layout);
        let render_bind_group = bind("blade_render_bind_group", &render_layout);

        log::debug!(
            "Blade buffers allocated: {} blades, {} KB of records",
            blade_count,
            record_size / 1024
        );

        Self {
            instance_buffer,
            record_buffer,
            staging_buffer,
            vertex_buffer,
            index_buffer,
            index_count: template.indices().len() as u32,
            blade_count,
            compute_layout,
            compute_bind_group,
            render_layout,
            render_bind_group,
        }
    }

    pub fn blade_count(&self) -> u32 {
        self.blade_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn instance_buffer(&self) -> &wgpu::Buffer {
        &self.instance_buffer
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    pub fn compute_layout(&self) -> &wgpu::BindGroupLayout {
        &self.compute_layout
    }

    pub fn compute_bind_group(&self) -> &wgpu::BindGroup {
        &self.compute_bind_group
    }

    pub fn render_layout(&self) -> &wgpu::BindGroupLayout {
        &self.render_layout
    }

    pub fn render_bind_group(&self) -> &wgpu::BindGroup {
        &self.render_bind_group
    }

    /// Copy the record buffer back to the CPU. Blocks until the GPU is done.
    pub fn read_records(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Vec<GpuBladeRecord>, Error> {
        if self.blade_count == 0 {
            return Ok(Vec::new());
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("blade_record_readback"),
        });
        encoder.copy_buffer_to_buffer(&self.record_buffer, 0, &self.staging_buffer, 0, self.record_buffer.size());
        queue.submit(std::iter::once(encoder.finish()));

        let slice = self.staging_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device
            .poll(wgpu::PollType::Wait { submission_index: None, timeout: None })
            .map_err(|e| Error::Gpu(e.to_string()))?;

        rx.recv()
            .map_err(|e| Error::Gpu(e.to_string()))?
            .map_err(|e| Error::Gpu(e.to_string()))?;

        let records = {
            let data = slice.get_mapped_range();
            let all: &[GpuBladeRecord] = bytemuck::cast_slice(&data);
            all[..self.blade_count as usize].to_vec()
        };
        self.staging_buffer.unmap();
        Ok(records)
    }
}
