//! Meadow - GPU-driven procedural grass

pub mod core;
pub mod math;
pub mod terrain;
pub mod grass;
pub mod render;
