//! Grass configuration (user-facing parameter groups).
//!
//! Mirrors the parameter panel of a live grass editor: shape, clump, angle,
//! wind, LOD, cull and color groups, each independently editable between
//! frames. The pipeline reads a `&GrassConfig` snapshot per frame and never
//! mutates it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::grass::template::MAX_SEGMENTS;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Full grass configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassConfig {
    /// Seed for the noise fields (wind strength, type trend).
    pub seed: u32,
    /// Vertex rows per blade minus one. Must be even so the tip row survives LOD folding.
    pub segments: u32,
    pub patch: PatchParams,
    pub shape: ShapeParams,
    pub clump: ClumpParams,
    pub angle: AngleParams,
    pub wind: WindParams,
    pub lod: LodParams,
    pub cull: CullParams,
    pub color: ColorParams,
}

impl Default for GrassConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            segments: 6,
            patch: PatchParams::default(),
            shape: ShapeParams::default(),
            clump: ClumpParams::default(),
            angle: AngleParams::default(),
            wind: WindParams::default(),
            lod: LodParams::default(),
            cull: CullParams::default(),
            color: ColorParams::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parameter groups
// ---------------------------------------------------------------------------

/// Patch layout: a `grid_size × grid_size` lattice over a square of side `patch_size`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchParams {
    pub grid_size: u32,
    /// Side length in meters.
    pub patch_size: f32,
    /// Root jitter as a fraction of cell spacing (bounded to 0.1).
    pub jitter: f32,
    /// World-space origin of the patch center.
    pub origin: [f32; 3],
}

impl Default for PatchParams {
    fn default() -> Self {
        Self {
            grid_size: 64,
            patch_size: 8.0,
            jitter: 0.1,
            origin: [0.0; 3],
        }
    }
}

/// Blade geometry ranges and per-blade randomness.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParams {
    pub height_min: f32,
    pub height_max: f32,
    pub width_min: f32,
    pub width_max: f32,
    /// Bend is the horizontal control-point offset as a fraction of height.
    pub bend_min: f32,
    pub bend_max: f32,
    /// Per-blade deviation from the clump value, as a fraction of it.
    pub height_randomness: f32,
    pub width_randomness: f32,
    pub bend_randomness: f32,
    /// Width-taper floor added to `t`: `(t + base_width) * (1 - t)^tip_thin`.
    pub base_width: f32,
    pub tip_thin: f32,
    /// Frequency of the clump type-trend noise over clump cell ids.
    pub type_trend_scale: f32,
    /// Edge thickening toward the camera at grazing view angles.
    pub view_thicken: f32,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            height_min: 0.35,
            height_max: 0.8,
            width_min: 0.025,
            width_max: 0.05,
            bend_min: 0.05,
            bend_max: 0.35,
            height_randomness: 0.3,
            width_randomness: 0.3,
            bend_randomness: 0.4,
            base_width: 0.35,
            tip_thin: 0.9,
            type_trend_scale: 0.35,
            view_thicken: 0.3,
        }
    }
}

/// Voronoi clump partition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClumpParams {
    /// Voronoi cell size in meters.
    pub clump_size: f32,
    /// Distance from the clump center at which presence reaches zero.
    pub clump_radius: f32,
    /// Tilt of the clump-cone shading normal away from the center.
    pub cone_strength: f32,
}

impl Default for ClumpParams {
    fn default() -> Self {
        Self {
            clump_size: 0.8,
            clump_radius: 1.5,
            cone_strength: 0.6,
        }
    }
}

/// Facing-angle composition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AngleParams {
    /// Weight of the angle toward the clump center.
    pub center_yaw: f32,
    /// Weight of the per-blade random yaw (full turn at 1.0).
    pub blade_yaw: f32,
    /// Weight of the per-clump random yaw (full turn at 1.0).
    pub clump_yaw: f32,
}

impl Default for AngleParams {
    fn default() -> Self {
        Self {
            center_yaw: 1.0,
            blade_yaw: 0.25,
            clump_yaw: 0.15,
        }
    }
}

/// Wind field and blade response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindParams {
    /// Horizontal direction (x, z); normalized on use.
    pub direction: [f32; 2],
    /// Scroll speed of the strength field, meters per second.
    pub speed: f32,
    /// Overall strength; 0 disables wind entirely.
    pub strength: f32,
    /// Spatial frequency of the strength noise.
    pub scale: f32,
    /// How far blades turn to face downwind at full strength.
    pub facing: f32,
    /// Steady push, as a fraction of height at the tip.
    pub push_strength: f32,
    pub sway_strength: f32,
    pub sway_freq_min: f32,
    pub sway_freq_max: f32,
    /// Slow gust envelope frequency in Hz.
    pub gust_frequency: f32,
    /// Traveling-wave phase per meter along the wind direction.
    pub wave_scale: f32,
    pub flutter_frequency: f32,
    pub flutter_strength: f32,
    /// Cross-wind deflection driven by flutter.
    pub cross_wind: f32,
    /// Wind falls off between these camera distances.
    pub distance_start: f32,
    pub distance_end: f32,
}

impl Default for WindParams {
    fn default() -> Self {
        Self {
            direction: [1.0, 0.35],
            speed: 0.8,
            strength: 0.7,
            scale: 0.12,
            facing: 0.35,
            push_strength: 0.25,
            sway_strength: 0.12,
            sway_freq_min: 0.6,
            sway_freq_max: 1.2,
            gust_frequency: 0.15,
            wave_scale: 0.35,
            flutter_frequency: 6.5,
            flutter_strength: 0.25,
            cross_wind: 0.4,
            distance_start: 25.0,
            distance_end: 60.0,
        }
    }
}

/// Vertex-row folding range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodParams {
    pub start: f32,
    pub end: f32,
}

impl Default for LodParams {
    fn default() -> Self {
        Self { start: 12.0, end: 28.0 }
    }
}

/// Distance-based density culling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullParams {
    pub start: f32,
    pub end: f32,
    /// Width boost at full cull weight for surviving blades.
    pub width_compensation: f32,
    /// Hash band below the survival threshold over which blades shrink.
    pub shrink_band: f32,
}

impl Default for CullParams {
    fn default() -> Self {
        Self {
            start: 15.0,
            end: 30.0,
            width_compensation: 1.5,
            shrink_band: 0.1,
        }
    }
}

/// Blade coloring for the shading stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorParams {
    pub base_color: [f32; 3],
    pub tip_color: [f32; 3],
    /// Per-clump tint variation driven by the clump seed.
    pub clump_tint: f32,
    /// Back-lit transmission strength.
    pub translucency: f32,
    pub ambient: f32,
}

impl Default for ColorParams {
    fn default() -> Self {
        Self {
            base_color: [0.05, 0.18, 0.03],
            tip_color: [0.42, 0.62, 0.18],
            clump_tint: 0.25,
            translucency: 0.35,
            ambient: 0.25,
        }
    }
}

// ---------------------------------------------------------------------------
// Load / save / validate
// ---------------------------------------------------------------------------

impl GrassConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        config.validate()?;
        log::info!("Loaded grass config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json_string()?)?;
        Ok(())
    }

    /// Check ranges the pipeline assumes but never defends.
    pub fn validate(&self) -> Result<()> {
        fn range(name: &str, min: f32, max: f32) -> Result<()> {
            if min > max {
                return Err(Error::Config(format!("{name}: min {min} exceeds max {max}")));
            }
            Ok(())
        }
        fn positive(name: &str, v: f32) -> Result<()> {
            if !(v > 0.0) {
                return Err(Error::Config(format!("{name} must be positive, got {v}")));
            }
            Ok(())
        }

        if self.patch.grid_size == 0 {
            return Err(Error::Config("patch.grid_size must be at least 1".into()));
        }
        positive("patch.patch_size", self.patch.patch_size)?;
        if !(0.0..=0.1).contains(&self.patch.jitter) {
            return Err(Error::Config(format!(
                "patch.jitter must be within [0, 0.1], got {}",
                self.patch.jitter
            )));
        }
        if self.segments == 0 || self.segments % 2 != 0 {
            return Err(Error::Config(format!(
                "segments must be a positive even number, got {}",
                self.segments
            )));
        }
        if self.segments > MAX_SEGMENTS {
            return Err(Error::Config(format!(
                "segments must be at most {}, got {}",
                MAX_SEGMENTS, self.segments
            )));
        }

        let s = &self.shape;
        positive("shape.height_min", s.height_min)?;
        positive("shape.width_min", s.width_min)?;
        range("shape.height", s.height_min, s.height_max)?;
        range("shape.width", s.width_min, s.width_max)?;
        range("shape.bend", s.bend_min, s.bend_max)?;
        positive("shape.tip_thin", s.tip_thin)?;

        positive("clump.clump_size", self.clump.clump_size)?;
        positive("clump.clump_radius", self.clump.clump_radius)?;

        let w = &self.wind;
        range("wind.sway_freq", w.sway_freq_min, w.sway_freq_max)?;
        range("wind.distance", w.distance_start, w.distance_end)?;
        range("lod", self.lod.start, self.lod.end)?;
        range("cull", self.cull.start, self.cull.end)?;
        Ok(())
    }

    /// True when any field that determines the blade layout differs.
    pub fn layout_differs(&self, other: &GrassConfig) -> bool {
        self.patch.grid_size != other.patch.grid_size
            || self.patch.patch_size != other.patch.patch_size
            || self.patch.jitter != other.patch.jitter
            || self.patch.origin != other.patch.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        GrassConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = GrassConfig::from_json_str(r#"{ "clump": { "clump_size": 2.0 } }"#).unwrap();
        assert_eq!(cfg.clump.clump_size, 2.0);
        assert_eq!(cfg.clump.clump_radius, ClumpParams::default().clump_radius);
        assert_eq!(cfg.wind, WindParams::default());
    }

    #[test]
    fn test_rejects_inverted_range() {
        let mut cfg = GrassConfig::default();
        cfg.shape.height_min = 1.0;
        cfg.shape.height_max = 0.5;
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_odd_segments() {
        let mut cfg = GrassConfig::default();
        cfg.segments = 5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_segments_bounded_by_index_range() {
        let mut cfg = GrassConfig::default();
        cfg.segments = MAX_SEGMENTS;
        assert!(cfg.validate().is_ok());
        cfg.segments = MAX_SEGMENTS + 2;
        assert!(cfg.validate().is_err());
        cfg.segments = 40000;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_grid() {
        let mut cfg = GrassConfig::default();
        cfg.patch.grid_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(GrassConfig::from_json_str("{ not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grass.json");

        let mut cfg = GrassConfig::default();
        cfg.wind.strength = 0.0;
        cfg.cull.start = 10.0;
        cfg.save(&path).unwrap();

        let loaded = GrassConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GrassConfig::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_layout_differs() {
        let a = GrassConfig::default();
        let mut b = a.clone();
        b.wind.speed = 3.0;
        assert!(!a.layout_differs(&b));
        b.patch.grid_size = 32;
        assert!(a.layout_differs(&b));
    }
}
