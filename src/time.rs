//! Frame timing for the loop that drives a field.
//!
//! The fields only ever see a `dt`. [`FrameClock`] turns wall-clock frames
//! into that delta, with the knobs a render loop usually wants: a fixed
//! cadence, slow motion, pause and a cap on the delta after a long stall.
//!
//! ```ignore
//! let mut clock = FrameClock::new().with_fixed_delta(Some(0.02));
//! loop {
//!     field.advance(clock.tick());
//! }
//! ```

use std::time::{Duration, Instant};

/// Frame delta used by the reference animation cadence.
pub const REFERENCE_DELTA: f32 = 0.02;

/// Produces one simulation delta per displayed frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// When the last tick happened.
    last_tick: Instant,
    /// Simulation seconds handed out so far.
    elapsed_secs: f32,
    /// Delta returned by the last tick.
    delta_secs: f32,
    /// Ticks since creation or reset.
    frame_count: u64,
    /// Use this delta instead of wall-clock time.
    fixed_delta: Option<f32>,
    /// Upper bound on a single wall-clock delta.
    max_delta: f32,
    /// Time scale multiplier (1.0 = normal speed).
    time_scale: f32,
    paused: bool,
    /// Frames per wall-clock second (updated periodically).
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Wall-clock driven clock starting now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_tick: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fixed_delta: None,
            max_delta: 0.1,
            time_scale: 1.0,
            paused: false,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Hand out `delta` every tick regardless of wall-clock time.
    /// `None` returns to wall-clock timing.
    pub fn with_fixed_delta(mut self, delta: Option<f32>) -> Self {
        self.set_fixed_delta(delta);
        self
    }

    /// Cap wall-clock deltas, so a stalled frame does not teleport the
    /// simulation forward.
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta.max(0.0);
        self
    }

    /// Advance one frame and return the simulation delta for it.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_secs = if self.paused {
            0.0
        } else {
            let base = self.fixed_delta.unwrap_or_else(|| raw.min(self.max_delta));
            base * self.time_scale
        };
        self.elapsed_secs += self.delta_secs;
        self.delta_secs
    }

    /// Simulation seconds handed out so far.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Delta returned by the last tick.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Ticks so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Delta handed out every tick, if fixed.
    #[inline]
    pub fn fixed_delta(&self) -> Option<f32> {
        self.fixed_delta
    }

    /// Measured ticks per wall-clock second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Whether time is paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current time scale multiplier.
    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Stop handing out time. Ticks still count frames.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after pausing.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Toggle pause state.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Set or clear the fixed delta. Negative deltas clamp to zero.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta.map(|d| d.max(0.0));
    }

    /// Set time scale multiplier.
    ///
    /// - `1.0` = normal speed
    /// - `0.5` = half speed
    /// - `2.0` = double speed
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Reset counters and elapsed time, keeping the configuration.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.last_tick = now;
        self.elapsed_secs = 0.0;
        self.delta_secs = 0.0;
        self.frame_count = 0;
        self.fps = 0.0;
        self.fps_frame_count = 0;
        self.fps_update_time = now;
        self.paused = false;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
