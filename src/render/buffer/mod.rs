//! GPU buffer management

pub mod blade_buffers;
pub mod frame_buffer;

pub use blade_buffers::{pack_instances, BladeBuffers, GpuBladeInstance};
pub use frame_buffer::{FrameBuffer, FrameUniform};
