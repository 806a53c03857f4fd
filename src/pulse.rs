//! Global pulse signal of the sphere field.
//!
//! The sphere slowly shrinks (`base_scale`) while breathing around that
//! size (`pulse_scale`). Each upward crossing of the raw sine through the
//! threshold is a pulse peak, which the field answers with a freeze batch.

use crate::config::PulseConfig;

/// Time, scales and peak detection for one field instance.
#[derive(Debug, Clone)]
pub struct Pulse {
    config: PulseConfig,
    time: f32,
    base_scale: f32,
    pulse_scale: f32,
    previous_raw: f32,
    count: u32,
}

impl Pulse {
    /// Signal at `t = 0`.
    pub fn new(config: PulseConfig) -> Self {
        Self {
            config,
            time: 0.0,
            base_scale: 1.0,
            pulse_scale: 1.0,
            previous_raw: 0.0,
            count: 0,
        }
    }

    /// Advance by `dt` seconds.
    ///
    /// Returns the ordinal of the pulse that fired this step, if any. A pulse
    /// fires when the raw sine reaches the threshold from below while the
    /// sphere still has a positive base scale. Staying above the threshold
    /// never fires again; the signal must drop below first.
    pub fn advance(&mut self, dt: f32) -> Option<u32> {
        self.time += dt;
        self.base_scale = (1.0 - self.time * self.config.shrink_rate).max(0.0);
        let raw = (self.time * self.config.frequency).sin();
        self.pulse_scale = 1.0 + self.config.amplitude * raw;

        let crossed = raw >= self.config.threshold && self.previous_raw < self.config.threshold;
        self.previous_raw = raw;

        if crossed && self.base_scale > 0.0 {
            self.count += 1;
            Some(self.count)
        } else {
            None
        }
    }

    /// Elapsed simulation time in seconds.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Slowly shrinking sphere size in `[0, 1]`.
    #[inline]
    pub fn base_scale(&self) -> f32 {
        self.base_scale
    }

    /// Breathing multiplier around 1.0.
    #[inline]
    pub fn pulse_scale(&self) -> f32 {
        self.pulse_scale
    }

    /// Current size of the live sphere.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.base_scale * self.pulse_scale
    }

    /// Current deviation of `pulse_scale` from 1.0.
    #[inline]
    pub fn amplitude(&self) -> f32 {
        self.pulse_scale - 1.0
    }

    /// Number of pulses fired so far.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whether the sphere has shrunk to nothing. No more pulses fire.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.base_scale <= 0.0
    }

    /// Signal configuration.
    pub fn config(&self) -> &PulseConfig {
        &self.config
    }
}
