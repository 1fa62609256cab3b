//! Mathematical utilities: hashing, noise, curves and coordinate frames

pub mod bezier;
pub mod frame;
pub mod hash;
pub mod noise;

pub use bezier::CubicBezier;
pub use frame::{ObjectPoint, PatchTransform, WorldPoint};
pub use noise::NoiseField;
