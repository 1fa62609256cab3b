//! Blade instance layout for a grass patch.
//!
//! A patch is a jittered `grid_size × grid_size` lattice of blade roots. The
//! layout is fixed for the patch lifetime and rebuilt only when the grid or
//! patch size changes.

use glam::{Vec2, Vec3};

use crate::grass::config::PatchParams;
use crate::math::frame::{ObjectPoint, PatchTransform};
use crate::math::hash::hash2;

/// Jitter is never allowed past this fraction of cell spacing.
pub const MAX_JITTER: f32 = 0.1;

/// One grass blade root.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BladeInstance {
    /// Root position in patch object space.
    pub position: ObjectPoint,
    /// Stable identity within the patch (row-major lattice index).
    pub index: u32,
}

/// Owns the blade instances of one patch.
#[derive(Clone, Debug)]
pub struct Patch {
    grid_size: u32,
    patch_size: f32,
    jitter: f32,
    transform: PatchTransform,
    instances: Vec<BladeInstance>,
}

impl Patch {
    pub fn new(params: &PatchParams) -> Self {
        let grid_size = params.grid_size;
        let patch_size = params.patch_size.max(0.0);
        let jitter = params.jitter.clamp(0.0, MAX_JITTER);
        let instances = layout(grid_size, patch_size, jitter);
        log::debug!(
            "Laid out grass patch: {}x{} blades over {:.2}m",
            grid_size, grid_size, patch_size
        );
        Self {
            grid_size,
            patch_size,
            jitter,
            transform: PatchTransform::new(Vec3::from_array(params.origin)),
            instances,
        }
    }

    /// Rebuild the layout if the params changed. Returns true when the
    /// instance set was reallocated.
    pub fn reconfigure(&mut self, params: &PatchParams) -> bool {
        self.transform = PatchTransform::new(Vec3::from_array(params.origin));
        let jitter = params.jitter.clamp(0.0, MAX_JITTER);
        if params.grid_size == self.grid_size
            && params.patch_size == self.patch_size
            && jitter == self.jitter
        {
            return false;
        }
        *self = Self::new(params);
        true
    }

    pub fn instances(&self) -> &[BladeInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    pub fn patch_size(&self) -> f32 {
        self.patch_size
    }

    /// Distance between neighbouring lattice cells.
    pub fn spacing(&self) -> f32 {
        spacing(self.grid_size, self.patch_size)
    }

    pub fn transform(&self) -> &PatchTransform {
        &self.transform
    }
}

fn spacing(grid_size: u32, patch_size: f32) -> f32 {
    if grid_size == 0 { 0.0 } else { patch_size / grid_size as f32 }
}

/// Lattice centered on the patch origin, each root offset by a hash of its
/// lattice coordinate bounded to `±jitter * spacing` per axis.
fn layout(grid_size: u32, patch_size: f32, jitter: f32) -> Vec<BladeInstance> {
    let spacing = spacing(grid_size, patch_size);
    let half = patch_size * 0.5;
    let mut instances = Vec::with_capacity((grid_size as usize).pow(2));
    for iz in 0..grid_size {
        for ix in 0..grid_size {
            let cell = Vec2::new(ix as f32, iz as f32);
            let offset = (hash2(cell + Vec2::new(0.31, 0.77)) * 2.0 - Vec2::ONE) * jitter * spacing;
            let x = -half + (ix as f32 + 0.5) * spacing + offset.x;
            let z = -half + (iz as f32 + 0.5) * spacing + offset.y;
            instances.push(BladeInstance {
                position: ObjectPoint(Vec3::new(x, 0.0, z)),
                index: iz * grid_size + ix,
            });
        }
    }
    instances
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn params(grid_size: u32, patch_size: f32) -> PatchParams {
        PatchParams { grid_size, patch_size, ..Default::default() }
    }

    #[test]
    fn test_instance_count() {
        let patch = Patch::new(&params(64, 8.0));
        assert_eq!(patch.len(), 64 * 64);
        assert!((patch.spacing() - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_unique_indices() {
        let patch = Patch::new(&params(16, 4.0));
        let ids: HashSet<u32> = patch.instances().iter().map(|b| b.index).collect();
        assert_eq!(ids.len(), patch.len());
    }

    #[test]
    fn test_jitter_bounded() {
        let patch = Patch::new(&params(32, 8.0));
        let spacing = patch.spacing();
        for blade in patch.instances() {
            let ix = blade.index % 32;
            let iz = blade.index / 32;
            let cx = -4.0 + (ix as f32 + 0.5) * spacing;
            let cz = -4.0 + (iz as f32 + 0.5) * spacing;
            let p = blade.position.0;
            assert!((p.x - cx).abs() <= MAX_JITTER * spacing + 1e-5);
            assert!((p.z - cz).abs() <= MAX_JITTER * spacing + 1e-5);
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn test_layout_deterministic() {
        let a = Patch::new(&params(8, 2.0));
        let b = Patch::new(&params(8, 2.0));
        assert_eq!(a.instances(), b.instances());
    }

    #[test]
    fn test_reconfigure() {
        let mut patch = Patch::new(&params(8, 2.0));
        assert!(!patch.reconfigure(&params(8, 2.0)));
        assert!(patch.reconfigure(&params(16, 2.0)));
        assert_eq!(patch.len(), 256);
        assert!(patch.reconfigure(&params(16, 4.0)));
        assert!((patch.spacing() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_origin_only_change_keeps_instances() {
        let mut patch = Patch::new(&params(8, 2.0));
        let moved = PatchParams { origin: [10.0, 0.0, 0.0], ..params(8, 2.0) };
        assert!(!patch.reconfigure(&moved));
        assert_eq!(patch.transform().origin, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_empty_grid() {
        let patch = Patch::new(&params(0, 8.0));
        assert!(patch.is_empty());
        assert_eq!(patch.spacing(), 0.0);
    }
}
