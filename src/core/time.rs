//! Simulation clock
//!
//! The wind model's only time input. Elapsed time is monotonic: it only grows,
//! by wall-clock ticks or by explicit fixed steps.

use std::time::{Duration, Instant};

/// Tracks frame timing and the elapsed simulation time fed to the grass pipeline.
pub struct SimClock {
    last_frame: Instant,
    delta: Duration,
    elapsed: f64,
    frame_count: u64,
    /// Multiplier applied to wall-clock deltas (0 freezes the wind).
    pub time_scale: f32,
}

impl SimClock {
    /// Create a new clock starting at zero elapsed time
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            elapsed: 0.0,
            frame_count: 0,
            time_scale: 1.0,
        }
    }

    /// Call once per frame to advance by the wall-clock delta
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.frame_count += 1;
        self.elapsed += self.delta.as_secs_f64() * self.time_scale.max(0.0) as f64;
    }

    /// Advance by a fixed step in seconds. Negative steps are ignored.
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.delta = Duration::from_secs_f32(dt);
        self.frame_count += 1;
        self.elapsed += dt as f64 * self.time_scale.max(0.0) as f64;
    }

    /// Elapsed simulation time in seconds
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed as f32
    }

    /// Get delta time of the last tick in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}
