//! Frame timing for the viewer.
//!
//! The emitter works in milliseconds, so [`Time`] reports its delta in
//! milliseconds too. Long stalls (window drags, breakpoints) are clamped to
//! [`MAX_DELTA_MS`] so every launcher does not expire on the same frame.
//!
//! ```ignore
//! let mut time = Time::new();
//!
//! // every frame
//! let delta_ms = time.update();
//! flame.update(delta_ms);
//! ```

use std::time::{Duration, Instant};

/// Largest delta a single frame may report.
pub const MAX_DELTA_MS: f32 = 100.0;

/// Frame clock with pause, time scale and optional fixed step.
#[derive(Debug)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    elapsed_ms: f32,
    delta_ms: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
    fixed_delta_ms: Option<f32>,
    time_scale: f32,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_ms: 0.0,
            delta_ms: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            fixed_delta_ms: None,
            time_scale: 1.0,
        }
    }

    /// Advance one frame and return its delta in milliseconds.
    ///
    /// Returns 0 while paused.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let raw_ms = now.duration_since(self.last_frame).as_secs_f32() * 1000.0;
        self.last_frame = now;

        if self.paused {
            self.delta_ms = 0.0;
            return 0.0;
        }

        let step = self.fixed_delta_ms.unwrap_or(raw_ms).min(MAX_DELTA_MS);
        self.delta_ms = step * self.time_scale;
        self.elapsed_ms += self.delta_ms;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_ms
    }

    /// Scaled simulation time in milliseconds, excluding pauses.
    #[inline]
    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    #[inline]
    pub fn delta_ms(&self) -> f32 {
        self.delta_ms
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Wall-clock time since the clock was created.
    pub fn wall_time(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.last_frame = Instant::now();
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Report `delta_ms` every frame regardless of wall time.
    pub fn set_fixed_delta(&mut self, delta_ms: Option<f32>) {
        self.fixed_delta_ms = delta_ms;
    }

    /// Negative scales are treated as 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
