//! Distance LOD: vertex-row folding and density culling.

use crate::grass::config::{CullParams, LodParams};
use crate::math::frame::{smoothstep, step};

/// Folding switches on when the LOD weight reaches this value.
pub const FOLD_THRESHOLD: f32 = 0.5;

/// Smooth LOD weight in `[0, 1]` for a camera distance.
pub fn lod_weight(distance: f32, params: &LodParams) -> f32 {
    smoothstep(params.start, params.end, distance)
}

/// Row used for the position of `row` at the given LOD weight.
///
/// Odd rows collapse onto the even row below them once the weight crosses
/// [`FOLD_THRESHOLD`]. The cutover is a hard step. The tip row (`last_row`)
/// is never folded.
pub fn fold_row(row: u32, last_row: u32, weight: f32) -> u32 {
    let fold = step(FOLD_THRESHOLD, weight) > 0.0;
    if fold && row % 2 == 1 && row < last_row {
        row - 1
    } else {
        row
    }
}

/// Curve parameter for the position of `row`, after folding.
pub fn folded_t(row: u32, segments: u32, weight: f32) -> f32 {
    if segments == 0 {
        return 0.0;
    }
    fold_row(row, segments, weight) as f32 / segments as f32
}

/// Outcome of the density cull for one blade.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CullResult {
    pub survives: bool,
    /// `smoothstep(cull.start, cull.end, distance)`.
    pub weight: f32,
    /// Highest hash that survives at this distance.
    pub threshold: f32,
    /// Shrink factor just below the threshold, 0 when culled.
    pub shrink: f32,
    /// Clump presence times shrink; 0 when culled.
    pub final_presence: f32,
    /// Width multiplier compensating for thinned density.
    pub width_scale: f32,
}

/// Decide survival of a blade with `lod_seed` at `distance`.
///
/// Must not be keyed on `per_blade_hash`, which already drives yaw jitter
/// and sway phase.
pub fn cull(lod_seed: f32, presence: f32, distance: f32, params: &CullParams) -> CullResult {
    let weight = smoothstep(params.start, params.end, distance);
    let threshold = 1.0 - weight;
    let survives = distance < params.end && lod_seed <= threshold;
    let shrink = if survives {
        1.0 - smoothstep(threshold - params.shrink_band, threshold, lod_seed)
    } else {
        0.0
    };
    CullResult {
        survives,
        weight,
        threshold,
        shrink,
        final_presence: presence * shrink,
        width_scale: 1.0 + params.width_compensation * weight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_is_idempotent() {
        let segments = 6;
        for weight in [0.0, 0.49, 0.5, 0.9, 1.0] {
            for row in 0..=segments {
                let once = fold_row(row, segments, weight);
                assert_eq!(fold_row(once, segments, weight), once);
            }
        }
    }

    #[test]
    fn test_fold_hard_cutover() {
        assert_eq!(fold_row(3, 6, 0.499), 3);
        assert_eq!(fold_row(3, 6, 0.5), 2);
        assert_eq!(fold_row(4, 6, 1.0), 4);
    }

    #[test]
    fn test_tip_never_folds() {
        for segments in [2, 4, 6, 8] {
            assert_eq!(fold_row(segments, segments, 1.0), segments);
            assert_eq!(folded_t(segments, segments, 1.0), 1.0);
        }
        // Even with an odd last row the tip stays put.
        assert_eq!(fold_row(5, 5, 1.0), 5);
    }

    #[test]
    fn test_lod_weight_range() {
        let params = LodParams::default();
        assert_eq!(lod_weight(0.0, &params), 0.0);
        assert_eq!(lod_weight(params.end + 1.0, &params), 1.0);
    }

    #[test]
    fn test_zero_hash_survives_until_end() {
        let params = CullParams { start: 15.0, end: 30.0, ..Default::default() };
        for d in [0.0, 10.0, 15.0, 22.5, 29.0, 29.999] {
            let r = cull(0.0, 1.0, d, &params);
            assert!(r.survives, "culled at {}", d);
        }
        for d in [30.0, 31.0, 500.0] {
            let r = cull(0.0, 1.0, d, &params);
            assert!(!r.survives);
            assert_eq!(r.final_presence, 0.0);
        }
    }

    #[test]
    fn test_no_culling_before_start() {
        let params = CullParams::default();
        let r = cull(0.999, 0.8, params.start - 1.0, &params);
        assert!(r.survives);
        assert_eq!(r.weight, 0.0);
        assert_eq!(r.width_scale, 1.0);
        assert!(r.shrink > 0.0);
    }

    #[test]
    fn test_shrink_before_vanish() {
        let params = CullParams { start: 0.0, end: 10.0, shrink_band: 0.2, width_compensation: 1.0 };
        // threshold = 0.5 at the midpoint
        let far_below = cull(0.1, 1.0, 5.0, &params);
        let near_edge = cull(0.45, 1.0, 5.0, &params);
        let above = cull(0.55, 1.0, 5.0, &params);
        assert_eq!(far_below.shrink, 1.0);
        assert!(near_edge.shrink > 0.0 && near_edge.shrink < 1.0);
        assert!(!above.survives);
        assert!((far_below.width_scale - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_survivors_thin_with_distance() {
        let params = CullParams::default();
        let count = |d: f32| (0..1000).filter(|i| cull(*i as f32 / 1000.0, 1.0, d, &params).survives).count();
        let near = count(10.0);
        let mid = count(22.0);
        let far = count(29.0);
        assert_eq!(near, 1000);
        assert!(mid < near && far < mid);
    }
}
