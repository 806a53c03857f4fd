//! Field configuration.
//!
//! Every tunable constant of the two simulations lives in a config struct
//! with sensible defaults, builder-style setters and `serde` support, so a
//! driver can load whole scenes from JSON.
//!
//! # Presets
//!
//! | Preset | Wiggle | Freeze policy | Density floor |
//! |--------|--------|---------------|---------------|
//! | [`SphereConfig::breathing`] | [`WiggleModel::Angular`] | [`FreezePolicy::HalfOrAll`] | 0.35 |
//! | [`SphereConfig::spring`] | [`WiggleModel::Spring`] | [`FreezePolicy::Fixed`] | 0.05 |
//!
//! # Scene files
//!
//! ```json
//! { "scene": "sphere", "count": 2000, "config": { "bias_power": 3.0 } }
//! ```
//!
//! Missing keys fall back to the defaults.

use crate::error::{ConfigError, LoadError};
use crate::time::REFERENCE_DELTA;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

// ============================================================================
// Pulse
// ============================================================================

/// Global breathing signal of the sphere.
///
/// `base_scale = max(0, 1 − t·shrink_rate)` and
/// `pulse_scale = 1 + amplitude·sin(t·frequency)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Linear shrink per second of the base scale.
    pub shrink_rate: f32,
    /// Amplitude of the pulse oscillation around 1.0.
    pub amplitude: f32,
    /// Angular frequency of the pulse (radians per second).
    pub frequency: f32,
    /// Raw sine value whose upward crossing fires a pulse.
    pub threshold: f32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            shrink_rate: 0.05,
            amplitude: 0.1,
            frequency: 3.0,
            threshold: 0.95,
        }
    }
}

impl PulseConfig {
    /// Check every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("pulse.shrink_rate", self.shrink_rate)?;
        non_negative("pulse.amplitude", self.amplitude)?;
        positive("pulse.frequency", self.frequency)?;
        finite("pulse.threshold", self.threshold)
    }
}

// ============================================================================
// Wiggle
// ============================================================================

/// How live sphere particles wobble around their home position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum WiggleModel {
    /// Perturb the spherical angles of the home point.
    ///
    /// `θ += theta_amplitude·sin(t + phase.x)`,
    /// `φ += phi_amplitude·cos(t + phase.y)`.
    Angular {
        /// Azimuth wobble in radians.
        theta_amplitude: f32,
        /// Polar wobble in radians.
        phi_amplitude: f32,
    },
    /// Radial spring reacting to the pulse plus a position-seeded orbit.
    Spring {
        /// Radial push proportional to the pulse amplitude.
        breathe_gain: f32,
        /// Radial spring oscillation gain.
        spring_gain: f32,
        /// Tangential orbit noise gain.
        orbit_gain: f32,
    },
}

impl Default for WiggleModel {
    fn default() -> Self {
        WiggleModel::Angular {
            theta_amplitude: 0.1,
            phi_amplitude: 0.2,
        }
    }
}

impl WiggleModel {
    /// The spring variant with its usual gains.
    pub fn spring() -> Self {
        WiggleModel::Spring {
            breathe_gain: 0.25,
            spring_gain: 0.2,
            orbit_gain: 0.05,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            WiggleModel::Angular {
                theta_amplitude,
                phi_amplitude,
            } => {
                finite("wiggle.theta_amplitude", theta_amplitude)?;
                finite("wiggle.phi_amplitude", phi_amplitude)
            }
            WiggleModel::Spring {
                breathe_gain,
                spring_gain,
                orbit_gain,
            } => {
                finite("wiggle.breathe_gain", breathe_gain)?;
                finite("wiggle.spring_gain", spring_gain)?;
                finite("wiggle.orbit_gain", orbit_gain)
            }
        }
    }
}

// ============================================================================
// Freeze policy
// ============================================================================

/// How many live particles a pulse freezes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum FreezePolicy {
    /// Half of the eligible particles, or all of them once that half drops
    /// below an eighth of the population.
    #[default]
    HalfOrAll,
    /// A fixed share of the population, capped at what is still eligible.
    Fixed {
        /// Share of the population frozen per pulse.
        fraction: f32,
    },
}

impl FreezePolicy {
    /// Number of particles to freeze out of `eligible`, in a field created
    /// for `population` particles. Never exceeds `eligible`.
    pub fn freeze_count(&self, eligible: usize, population: usize) -> usize {
        match *self {
            FreezePolicy::HalfOrAll => {
                let half = (eligible + 1) / 2;
                if half < population / 8 {
                    eligible
                } else {
                    half
                }
            }
            FreezePolicy::Fixed { fraction } => {
                let wanted = (population as f32 * fraction.max(0.0)).round() as usize;
                wanted.min(eligible)
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            FreezePolicy::HalfOrAll => Ok(()),
            FreezePolicy::Fixed { fraction } => unit("freeze.fraction", fraction),
        }
    }
}

// ============================================================================
// Sphere
// ============================================================================

/// Configuration of a [`SphereParticleField`](crate::SphereParticleField).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    /// Exponent of the rim-bias acceptance curve. Higher = thinner center.
    pub bias_power: f32,
    /// Acceptance probability at the center of the projected disk.
    pub acceptance_floor: f32,
    /// Sampling attempts allowed per requested particle.
    pub attempts_per_point: u32,
    /// Share of particles whose alpha breathes while live.
    pub fade_probability: f32,
    /// Exponent of the live breathing curve `1 − t^n`.
    pub breath_exponent: f32,
    /// Global pulse signal.
    pub pulse: PulseConfig,
    /// Live particle wobble.
    pub wiggle: WiggleModel,
    /// Pulse freeze batch size.
    pub freeze: FreezePolicy,
    /// Delay between freezing and the start of the fade (seconds).
    pub fade_delay: Range<f32>,
    /// Length of the fade once started (seconds).
    pub fade_duration: Range<f32>,
    /// Constant part of the ejection distance.
    pub ejection_base: f32,
    /// Ejection distance gained per unit of pulse amplitude.
    pub ejection_gain: f32,
    /// Upper bound of the random ejection distance term.
    pub ejection_jitter: f32,
    /// Time for an ejected particle to reach its full distance (seconds).
    pub ejection_ramp: f32,
    /// Amplitude of the drift of frozen particles.
    pub frozen_wiggle: f32,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self::breathing()
    }
}

impl SphereConfig {
    /// Angular wobble, half-or-all freezing, dense center.
    pub fn breathing() -> Self {
        Self {
            bias_power: 2.5,
            acceptance_floor: 0.35,
            attempts_per_point: 10,
            fade_probability: 0.5,
            breath_exponent: 12.0,
            pulse: PulseConfig::default(),
            wiggle: WiggleModel::default(),
            freeze: FreezePolicy::HalfOrAll,
            fade_delay: 0.2..3.2,
            fade_duration: 0.6..4.6,
            ejection_base: 0.05,
            ejection_gain: 1.5,
            ejection_jitter: 0.5,
            ejection_ramp: 1.5,
            frozen_wiggle: 0.05,
        }
    }

    /// Spring wobble, steady eighth-of-population bursts, hollow center.
    pub fn spring() -> Self {
        Self {
            acceptance_floor: 0.05,
            wiggle: WiggleModel::spring(),
            freeze: FreezePolicy::Fixed { fraction: 0.125 },
            ..Self::breathing()
        }
    }

    /// Set the rim-bias exponent.
    pub fn with_bias_power(mut self, power: f32) -> Self {
        self.bias_power = power;
        self
    }

    /// Set the acceptance probability at the disk center.
    pub fn with_acceptance_floor(mut self, floor: f32) -> Self {
        self.acceptance_floor = floor;
        self
    }

    /// Set the share of breathing particles.
    pub fn with_fade_probability(mut self, probability: f32) -> Self {
        self.fade_probability = probability;
        self
    }

    /// Replace the pulse signal.
    pub fn with_pulse(mut self, pulse: PulseConfig) -> Self {
        self.pulse = pulse;
        self
    }

    /// Replace the wiggle model.
    pub fn with_wiggle(mut self, wiggle: WiggleModel) -> Self {
        self.wiggle = wiggle;
        self
    }

    /// Replace the freeze policy.
    pub fn with_freeze_policy(mut self, freeze: FreezePolicy) -> Self {
        self.freeze = freeze;
        self
    }

    /// Set the random fade delay and duration ranges.
    pub fn with_fade(mut self, delay: Range<f32>, duration: Range<f32>) -> Self {
        self.fade_delay = delay;
        self.fade_duration = duration;
        self
    }

    /// Set the ejection ramp time.
    pub fn with_ejection_ramp(mut self, seconds: f32) -> Self {
        self.ejection_ramp = seconds;
        self
    }

    /// Acceptance probability of a sample at projected radius `r`.
    ///
    /// `floor + (1 − floor)·r^bias_power`, non-decreasing in `r`.
    pub fn rim_acceptance(&self, r: f32) -> f32 {
        let r = r.clamp(0.0, 1.0);
        self.acceptance_floor + (1.0 - self.acceptance_floor) * r.powf(self.bias_power)
    }

    /// Check every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("bias_power", self.bias_power)?;
        unit("acceptance_floor", self.acceptance_floor)?;
        unit("fade_probability", self.fade_probability)?;
        positive("breath_exponent", self.breath_exponent)?;
        self.pulse.validate()?;
        self.wiggle.validate()?;
        self.freeze.validate()?;
        range("fade_delay", &self.fade_delay, false)?;
        range("fade_duration", &self.fade_duration, true)?;
        non_negative("ejection_base", self.ejection_base)?;
        non_negative("ejection_gain", self.ejection_gain)?;
        non_negative("ejection_jitter", self.ejection_jitter)?;
        positive("ejection_ramp", self.ejection_ramp)?;
        finite("frozen_wiggle", self.frozen_wiggle)
    }
}

// ============================================================================
// Stream
// ============================================================================

/// Configuration of a [`StreamParticleField`](crate::StreamParticleField).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Upper bound of the column.
    pub top: f32,
    /// Lower bound of the column; points below it wrap to the top.
    pub bottom: f32,
    /// Height over which initial points are staggered, from `top` down.
    pub spawn_span: f32,
    /// Per-point fall distance per reference frame.
    pub fall_speed: Range<f32>,
    /// Frame length the fall speeds are expressed in (seconds).
    pub frame_reference: f32,
    /// Horizontal scale at the top of the column.
    pub taper_top: f32,
    /// Horizontal scale at the bottom of the column.
    pub taper_bottom: f32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            top: 1.5,
            bottom: -1.5,
            spawn_span: 2.5,
            fall_speed: 0.005..0.025,
            frame_reference: 1.0 / 60.0,
            taper_top: 0.35,
            taper_bottom: 0.6,
        }
    }
}

impl StreamConfig {
    /// Set the column bounds.
    pub fn with_bounds(mut self, bottom: f32, top: f32) -> Self {
        self.bottom = bottom;
        self.top = top;
        self
    }

    /// Set the per-frame fall speed range.
    pub fn with_fall_speed(mut self, speed: Range<f32>) -> Self {
        self.fall_speed = speed;
        self
    }

    /// Set the frame length fall speeds refer to.
    pub fn with_frame_reference(mut self, seconds: f32) -> Self {
        self.frame_reference = seconds;
        self
    }

    /// Set the horizontal taper at the top and bottom.
    pub fn with_taper(mut self, top: f32, bottom: f32) -> Self {
        self.taper_top = top;
        self.taper_bottom = bottom;
        self
    }

    /// Column height.
    #[inline]
    pub fn span(&self) -> f32 {
        self.top - self.bottom
    }

    /// Horizontal scale at height `y`: `taper_top` at the top,
    /// `taper_bottom` at the bottom, linear in between.
    pub fn taper_at(&self, y: f32) -> f32 {
        let normalized = ((y - self.bottom) / self.span()).clamp(0.0, 1.0);
        self.taper_top + (self.taper_bottom - self.taper_top) * (1.0 - normalized)
    }

    /// Check every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("top", self.top)?;
        finite("bottom", self.bottom)?;
        if self.bottom >= self.top {
            return Err(ConfigError::InvertedBounds {
                bottom: self.bottom,
                top: self.top,
            });
        }
        non_negative("spawn_span", self.spawn_span)?;
        if self.spawn_span > self.span() {
            return Err(ConfigError::SpawnSpanTooLarge {
                spawn_span: self.spawn_span,
                column: self.span(),
            });
        }
        range("fall_speed", &self.fall_speed, true)?;
        positive("frame_reference", self.frame_reference)?;
        finite("taper_top", self.taper_top)?;
        finite("taper_bottom", self.taper_bottom)
    }
}

// ============================================================================
// Scene
// ============================================================================

/// A complete field description: which field, how many points, which config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scene", rename_all = "snake_case")]
pub enum SceneConfig {
    /// A pulsing sphere.
    Sphere {
        /// Requested particle count.
        count: usize,
        /// Field configuration.
        #[serde(default)]
        config: SphereConfig,
    },
    /// A falling stream.
    Stream {
        /// Particle count.
        count: usize,
        /// Field configuration.
        #[serde(default)]
        config: StreamConfig,
    },
}

impl SceneConfig {
    /// Parse and validate a JSON scene document.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        let scene: SceneConfig = serde_json::from_str(text)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Read, parse and validate a JSON scene file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Requested particle count.
    pub fn count(&self) -> usize {
        match self {
            SceneConfig::Sphere { count, .. } | SceneConfig::Stream { count, .. } => *count,
        }
    }

    /// Frame delta the scene is meant to be advanced with: the reference
    /// cadence for a sphere, `frame_reference` for a stream.
    pub fn frame_delta(&self) -> f32 {
        match self {
            SceneConfig::Sphere { .. } => REFERENCE_DELTA,
            SceneConfig::Stream { config, .. } => config.frame_reference,
        }
    }

    /// Validate the inner config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            SceneConfig::Sphere { config, .. } => config.validate(),
            SceneConfig::Stream { config, .. } => config.validate(),
        }
    }
}

// ============================================================================
// Checks
// ============================================================================

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

fn range(field: &'static str, r: &Range<f32>, strictly_positive: bool) -> Result<(), ConfigError> {
    finite(field, r.start)?;
    finite(field, r.end)?;
    if r.end < r.start {
        return Err(ConfigError::EmptyRange {
            field,
            start: r.start,
            end: r.end,
        });
    }
    if strictly_positive {
        positive(field, r.start)
    } else {
        non_negative(field, r.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        assert_eq!(SphereConfig::breathing().validate(), Ok(()));
        assert_eq!(SphereConfig::spring().validate(), Ok(()));
        assert_eq!(StreamConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_half_or_all_policy() {
        let policy = FreezePolicy::HalfOrAll;
        // Plenty eligible: half, rounded up
        assert_eq!(policy.freeze_count(1000, 1000), 500);
        assert_eq!(policy.freeze_count(301, 1000), 151);
        // Half would be below N/8 = 125: take everything
        assert_eq!(policy.freeze_count(240, 1000), 240);
        assert_eq!(policy.freeze_count(1, 1000), 1);
        assert_eq!(policy.freeze_count(0, 1000), 0);
    }

    #[test]
    fn test_fixed_policy_caps_at_eligible() {
        let policy = FreezePolicy::Fixed { fraction: 0.125 };
        assert_eq!(policy.freeze_count(1000, 1000), 125);
        assert_eq!(policy.freeze_count(40, 1000), 40);
    }

    #[test]
    fn test_rim_acceptance_monotonic() {
        let config = SphereConfig::breathing();
        let mut previous = config.rim_acceptance(0.0);
        assert!((previous - 0.35).abs() < 1e-6);
        for i in 1..=100 {
            let a = config.rim_acceptance(i as f32 / 100.0);
            assert!(a >= previous);
            previous = a;
        }
        assert!((previous - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_taper_narrow_at_top() {
        let config = StreamConfig::default();
        assert!((config.taper_at(config.top) - 0.35).abs() < 1e-6);
        assert!((config.taper_at(config.bottom) - 0.6).abs() < 1e-6);
        assert!(config.taper_at(0.0) > config.taper_at(1.0));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let nan = SphereConfig::breathing().with_bias_power(f32::NAN);
        assert_eq!(nan.validate(), Err(ConfigError::NonFinite { field: "bias_power" }));

        #[allow(clippy::reversed_empty_ranges)]
        let empty = SphereConfig::breathing().with_fade(3.0..1.0, 0.6..4.6);
        assert!(matches!(empty.validate(), Err(ConfigError::EmptyRange { .. })));

        let inverted = StreamConfig::default().with_bounds(1.0, -1.0);
        assert!(matches!(inverted.validate(), Err(ConfigError::InvertedBounds { .. })));

        let zero_duration = SphereConfig::breathing().with_fade(0.2..3.2, 0.0..0.0);
        assert!(matches!(zero_duration.validate(), Err(ConfigError::NonPositive { .. })));
    }

    #[test]
    fn test_spawn_span_must_fit_column() {
        let full = StreamConfig {
            spawn_span: 3.0,
            ..StreamConfig::default()
        };
        assert_eq!(full.validate(), Ok(()));

        let tall = StreamConfig {
            spawn_span: 10.0,
            ..StreamConfig::default()
        };
        assert_eq!(
            tall.validate(),
            Err(ConfigError::SpawnSpanTooLarge {
                spawn_span: 10.0,
                column: 3.0,
            })
        );

        // Shrinking the column below the default stagger is caught too
        let short = StreamConfig::default().with_bounds(-1.0, 1.0);
        assert!(matches!(short.validate(), Err(ConfigError::SpawnSpanTooLarge { .. })));

        let err = SceneConfig::from_json(
            r#"{ "scene": "stream", "count": 10, "config": { "spawn_span": 10.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ConfigError::SpawnSpanTooLarge { .. })));
    }

    #[test]
    fn test_scene_json_defaults() {
        let scene = SceneConfig::from_json(r#"{ "scene": "sphere", "count": 500 }"#).unwrap();
        assert_eq!(
            scene,
            SceneConfig::Sphere {
                count: 500,
                config: SphereConfig::breathing(),
            }
        );
    }

    #[test]
    fn test_scene_json_partial_override() {
        let scene = SceneConfig::from_json(
            r#"{
                "scene": "sphere",
                "count": 100,
                "config": {
                    "bias_power": 3.0,
                    "wiggle": { "model": "spring", "breathe_gain": 0.3, "spring_gain": 0.2, "orbit_gain": 0.0 },
                    "freeze": { "policy": "fixed", "fraction": 0.25 }
                }
            }"#,
        )
        .unwrap();
        let SceneConfig::Sphere { config, .. } = scene else {
            panic!("expected a sphere scene");
        };
        assert_eq!(config.bias_power, 3.0);
        assert_eq!(config.acceptance_floor, 0.35);
        assert_eq!(config.freeze, FreezePolicy::Fixed { fraction: 0.25 });
        assert!(matches!(config.wiggle, WiggleModel::Spring { .. }));
    }

    #[test]
    fn test_scene_frame_delta() {
        let sphere = SceneConfig::Sphere {
            count: 10,
            config: SphereConfig::spring(),
        };
        assert_eq!(sphere.frame_delta(), REFERENCE_DELTA);

        let stream = SceneConfig::Stream {
            count: 10,
            config: StreamConfig::default().with_frame_reference(0.025),
        };
        assert_eq!(stream.frame_delta(), 0.025);
        assert_eq!(
            SceneConfig::Stream {
                count: 10,
                config: StreamConfig::default(),
            }
            .frame_delta(),
            1.0 / 60.0
        );
    }

    #[test]
    fn test_scene_json_round_trip() {
        let scene = SceneConfig::Stream {
            count: 50,
            config: StreamConfig::default().with_taper(0.2, 0.8),
        };
        let text = scene.to_json().unwrap();
        assert_eq!(SceneConfig::from_json(&text).unwrap(), scene);
    }

    #[test]
    fn test_scene_json_rejects_invalid() {
        let err = SceneConfig::from_json(
            r#"{ "scene": "stream", "count": 10, "config": { "top": -2.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ConfigError::InvertedBounds { .. })));

        let err = SceneConfig::from_json(r#"{ "scene": "cube", "count": 10 }"#).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }
}
