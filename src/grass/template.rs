//! Shared blade strip mesh.
//!
//! Every blade is drawn from the same `(segments + 1) × 2` vertex strip; all
//! per-blade variation comes from the record and the shaping stage.

use bytemuck::{Pod, Zeroable};

/// One template vertex (16 bytes). Must match `TemplateVertex` in blade_render.wgsl.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TemplateVertex {
    /// Unfolded position along the blade, `[0, 1]`.
    pub t: f32,
    /// Side, -1 (left) or +1 (right).
    pub side: f32,
    pub row: u32,
    pub _pad: u32,
}

/// Largest even segment count whose `(segments + 1) * 2` vertices stay
/// addressable by u16 indices.
pub const MAX_SEGMENTS: u32 = 32766;

#[derive(Clone, Debug)]
pub struct BladeTemplate {
    segments: u32,
    vertices: Vec<TemplateVertex>,
    indices: Vec<u16>,
}

impl BladeTemplate {
    /// Segment count is clamped to `[1, MAX_SEGMENTS]`.
    pub fn new(segments: u32) -> Self {
        let segments = segments.clamp(1, MAX_SEGMENTS);
        let mut vertices = Vec::with_capacity((segments as usize + 1) * 2);
        for row in 0..=segments {
            let t = row as f32 / segments as f32;
            for side in [-1.0, 1.0] {
                vertices.push(TemplateVertex { t, side, row, _pad: 0 });
            }
        }

        let mut indices = Vec::with_capacity(segments as usize * 6);
        for row in 0..segments as u16 {
            let l0 = row * 2;
            let r0 = l0 + 1;
            let l1 = l0 + 2;
            let r1 = l0 + 3;
            indices.extend_from_slice(&[l0, r0, l1, r0, r1, l1]);
        }

        Self { segments, vertices, indices }
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    pub fn vertices(&self) -> &[TemplateVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Vertex buffer layout for the render pipeline.
    pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32, 1 => Float32, 2 => Uint32];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TemplateVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<TemplateVertex>(), 16);
    }

    #[test]
    fn test_counts() {
        let template = BladeTemplate::new(6);
        assert_eq!(template.vertex_count(), 14);
        assert_eq!(template.indices().len(), 36);
        assert!(template.indices().iter().all(|&i| (i as usize) < template.vertex_count()));
    }

    #[test]
    fn test_rows_span_blade() {
        let template = BladeTemplate::new(4);
        let first = template.vertices()[0];
        let last = template.vertices()[template.vertex_count() - 1];
        assert_eq!((first.t, first.side, first.row), (0.0, -1.0, 0));
        assert_eq!((last.t, last.side, last.row), (1.0, 1.0, 4));
    }

    #[test]
    fn test_zero_segments_clamped() {
        let template = BladeTemplate::new(0);
        assert_eq!(template.segments(), 1);
        assert_eq!(template.vertex_count(), 4);
    }

    #[test]
    fn test_large_segment_count_stays_in_u16() {
        let template = BladeTemplate::new(MAX_SEGMENTS);
        assert_eq!(template.vertex_count(), (MAX_SEGMENTS as usize + 1) * 2);
        assert!(template.vertex_count() <= u16::MAX as usize + 1);
        let max = template.indices().iter().copied().max().unwrap_or(0);
        assert_eq!(max as usize, template.vertex_count() - 1);

        let clamped = BladeTemplate::new(40000);
        assert_eq!(clamped.segments(), MAX_SEGMENTS);
        assert_eq!(clamped.indices().len(), MAX_SEGMENTS as usize * 6);
    }
}
