//! Render pipelines

pub mod blade_compute;
pub mod blade_render;

pub use blade_compute::{workgroup_count, BladeComputePipeline, WORKGROUP_SIZE};
pub use blade_render::{BladeRenderPipeline, RenderTarget, COLOR_FORMAT, DEPTH_FORMAT};
