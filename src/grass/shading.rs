//! Shading normal blend and blade colour.
//!
//! Distant and culled-out blades are too small to carry their own specular
//! response, so their normal leans toward the clump cone and the ground.

use glam::{Vec2, Vec3};

use crate::core::camera::DirectionalLight;
use crate::grass::config::ColorParams;
use crate::grass::record::BladeRecord;
use crate::math::frame::{safe_normalize3, smoothstep};

/// Camera distance over which the geometric normal gives way to the cone.
pub const CONE_BLEND_START: f32 = 4.0;
pub const CONE_BLEND_END: f32 = 30.0;

/// Inputs to [`shading_normal`] for one vertex.
#[derive(Clone, Copy, Debug)]
pub struct NormalInputs {
    /// Geometric normal, world space.
    pub geometric: Vec3,
    /// Unit XZ direction from the blade toward its clump center.
    pub to_center: Vec2,
    pub t: f32,
    pub camera_distance: f32,
    pub cull_weight: f32,
    /// Unit vector from the vertex toward the camera.
    pub view_dir: Vec3,
}

/// Normal of the cone spanned by a clump: up, tilted away from the center.
pub fn clump_cone_normal(to_center: Vec2, cone_strength: f32) -> Vec3 {
    let away = -to_center * cone_strength;
    safe_normalize3(Vec3::new(away.x, 1.0, away.y), Vec3::Y)
}

/// Blend geometric, clump-cone and ground normals.
///
/// The geometric normal is flipped to face the viewer. Its weight falls with
/// camera distance; the ground normal takes over near the root and as the
/// cull weight grows.
pub fn shading_normal(input: &NormalInputs, cone_strength: f32) -> Vec3 {
    let geometric = safe_normalize3(input.geometric, Vec3::Y);
    let geometric = if geometric.dot(input.view_dir) < 0.0 { -geometric } else { geometric };
    let cone = clump_cone_normal(input.to_center, cone_strength);

    let far = smoothstep(CONE_BLEND_START, CONE_BLEND_END, input.camera_distance);
    let root = (1.0 - input.t.clamp(0.0, 1.0)).powi(2) * 0.5;
    let ground = root.max(input.cull_weight.clamp(0.0, 1.0));

    let n = geometric.lerp(cone, far);
    safe_normalize3(n.lerp(Vec3::Y, ground), Vec3::Y)
}

/// Base-to-tip gradient tinted per clump, with Lambert and back-lit
/// translucency terms from the directional light.
pub fn blade_color(
    record: &BladeRecord,
    t: f32,
    normal: Vec3,
    view_dir: Vec3,
    light: &DirectionalLight,
    params: &ColorParams,
) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let base = Vec3::from_array(params.base_color);
    let tip = Vec3::from_array(params.tip_color);
    let tint = 1.0 + (record.clump_seed - 0.5) * 2.0 * params.clump_tint;
    let albedo = base.lerp(tip, t) * tint.max(0.0);

    let lambert = normal.dot(light.direction).max(0.0);
    let back = view_dir.dot(-light.direction).max(0.0).powi(4);
    let transmitted = back * params.translucency * t;

    albedo * (params.ambient + (lambert + transmitted) * light.color)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> NormalInputs {
        NormalInputs {
            geometric: Vec3::Z,
            to_center: Vec2::X,
            t: 1.0,
            camera_distance: 1.0,
            cull_weight: 0.0,
            view_dir: Vec3::Z,
        }
    }

    #[test]
    fn test_near_tip_keeps_geometric() {
        let n = shading_normal(&inputs(), 0.6);
        assert!((n - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_flips_toward_viewer() {
        let n = shading_normal(&NormalInputs { view_dir: Vec3::NEG_Z, ..inputs() }, 0.6);
        assert!(n.z < 0.0);
    }

    #[test]
    fn test_far_uses_cone() {
        let n = shading_normal(&NormalInputs { camera_distance: 100.0, ..inputs() }, 0.6);
        let cone = clump_cone_normal(Vec2::X, 0.6);
        assert!((n - cone).length() < 1e-5);
        assert!(cone.x < 0.0 && cone.y > 0.0);
    }

    #[test]
    fn test_full_cull_weight_is_ground() {
        let n = shading_normal(&NormalInputs { cull_weight: 1.0, ..inputs() }, 0.6);
        assert!((n - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_normal_always_unit() {
        let degenerate = NormalInputs {
            geometric: Vec3::ZERO,
            to_center: Vec2::ZERO,
            t: 0.3,
            camera_distance: 12.0,
            cull_weight: 0.2,
            view_dir: Vec3::Y,
        };
        let n = shading_normal(&degenerate, 0.6);
        assert!((n.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_color_gradient_and_light() {
        let params = ColorParams::default();
        let light = DirectionalLight::default();
        let record = BladeRecord { clump_seed: 0.5, ..Default::default() };
        let root = blade_color(&record, 0.0, Vec3::Y, Vec3::Z, &light, &params);
        let tip = blade_color(&record, 1.0, Vec3::Y, Vec3::Z, &light, &params);
        assert!(tip.y > root.y);

        let lit = blade_color(&record, 0.5, light.direction, Vec3::Z, &light, &params);
        let unlit = blade_color(&record, 0.5, -light.direction, Vec3::Z, &light, &params);
        assert!(lit.length() > unlit.length());
        assert!(unlit.length() > 0.0);
    }

    #[test]
    fn test_backlight_translucency() {
        let params = ColorParams::default();
        let light = DirectionalLight::new(Vec3::new(0.0, 0.2, 1.0), Vec3::ONE);
        let record = BladeRecord { clump_seed: 0.5, ..Default::default() };
        let behind = blade_color(&record, 1.0, Vec3::X, -light.direction, &light, &params);
        let front = blade_color(&record, 1.0, Vec3::X, light.direction, &light, &params);
        assert!(behind.length() > front.length());
    }
}
