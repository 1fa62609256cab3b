//! Cubic Bezier evaluation for blade spines.

use glam::Vec3;

/// Cubic Bezier curve defined by four control points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub points: [Vec3; 4],
}

impl CubicBezier {
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self { points: [p0, p1, p2, p3] }
    }

    /// Position at `t` (clamped to `[0, 1]`).
    pub fn eval(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let [p0, p1, p2, p3] = self.points;
        p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
    }

    /// First derivative at `t` (not normalized).
    pub fn derivative(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let [p0, p1, p2, p3] = self.points;
        (p1 - p0) * (3.0 * u * u) + (p2 - p1) * (6.0 * u * t) + (p3 - p2) * (3.0 * t * t)
    }

    /// Unit tangent at `t`. Falls back to the chord, then to +Y, when the
    /// derivative vanishes (coincident control points).
    pub fn tangent(&self, t: f32) -> Vec3 {
        let chord = self.points[3] - self.points[0];
        let fallback = chord.try_normalize().unwrap_or(Vec3::Y);
        self.derivative(t).try_normalize().unwrap_or(fallback)
    }
}
