//! The pulsing sphere field.
//!
//! Points are sampled over the unit sphere with extra density toward the
//! projected rim. Every frame the sphere shrinks a little and breathes; each
//! pulse peak freezes a batch of live points, which are then thrown outward
//! and fade out independently.
//!
//! ```ignore
//! let mut field = SphereParticleField::with_config(2000, SphereConfig::spring());
//! field.advance(0.02);
//! for point in field.snapshot() {
//!     draw(point.position, point.alpha);
//! }
//! ```

use crate::config::{SphereConfig, WiggleModel};
use crate::field::{sanitize_dt, ParticleField, Viewport};
use crate::lifecycle::{unit_or_zero, Breathing, Ejection, FadeWindow, Frozen, Phase, SphereParticle};
use crate::points::SpherePoint;
use crate::pulse::Pulse;
use crate::spawn::Sampler;
use glam::Vec3;
use tracing::{debug, trace};

/// Shimmer added to the x drift of frozen particles.
const FROZEN_SHIMMER: f32 = 0.005;

/// A breathing sphere of points with periodic ejection bursts.
#[derive(Debug, Clone)]
pub struct SphereParticleField {
    config: SphereConfig,
    pulse: Pulse,
    particles: Vec<SphereParticle>,
    points: Vec<SpherePoint>,
    /// Scratch list of live indices, reused across pulses.
    eligible: Vec<usize>,
    sampler: Sampler,
    viewport: Viewport,
    requested: usize,
}

impl SphereParticleField {
    /// Field of up to `count` points with the default config.
    pub fn new(count: usize) -> Self {
        Self::with_config(count, SphereConfig::default())
    }

    /// Field of up to `count` points with the given config.
    pub fn with_config(count: usize, config: SphereConfig) -> Self {
        Self::with_sampler(count, config, Sampler::new())
    }

    /// Field of up to `count` points drawing randomness from `sampler`.
    ///
    /// Sampling gives up after `count × attempts_per_point` draws; the field
    /// then simply holds fewer points than requested.
    pub fn with_sampler(count: usize, config: SphereConfig, mut sampler: Sampler) -> Self {
        let particles = sample_particles(count, &config, &mut sampler);
        debug!(requested = count, sampled = particles.len(), "Sphere field created");

        let mut field = Self {
            pulse: Pulse::new(config.pulse.clone()),
            points: vec![SpherePoint::default(); particles.len()],
            eligible: Vec::with_capacity(particles.len()),
            particles,
            config,
            sampler,
            viewport: Viewport::default(),
            requested: count,
        };
        field.write_points();
        field
    }

    /// Freeze a batch of live particles in answer to pulse `ordinal`.
    fn freeze_batch(&mut self, ordinal: u32) {
        self.eligible.clear();
        self.eligible.extend(
            self.particles
                .iter()
                .enumerate()
                .filter(|(_, p)| !p.is_frozen())
                .map(|(i, _)| i),
        );
        if self.eligible.is_empty() {
            trace!(pulse = ordinal, "No live particles left to freeze");
            return;
        }

        let eligible = self.eligible.len();
        let amount = self.config.freeze.freeze_count(eligible, self.requested);
        let time = self.pulse.time();
        let scale = self.pulse.scale();
        let amplitude = self.pulse.amplitude();

        let chosen = self.sampler.choose_distinct(&mut self.eligible, amount);
        for &index in chosen {
            let delay = self.sampler.random_in(&self.config.fade_delay);
            let duration = self.sampler.random_in(&self.config.fade_duration);
            let speed = self.config.ejection_base
                + amplitude * self.config.ejection_gain
                + self.sampler.random() * self.config.ejection_jitter;

            let particle = &mut self.particles[index];
            let direction = unit_or_zero(particle.home());
            particle.freeze(Frozen {
                pulse: ordinal,
                frozen_at: time,
                scale,
                fade: FadeWindow {
                    start: time + delay,
                    duration,
                },
                ejection: Ejection {
                    direction,
                    speed: speed.max(0.0),
                },
            });
        }

        debug!(pulse = ordinal, eligible, frozen = amount, time, "Pulse froze particles");
    }

    /// Recompute every particle's position and alpha for the current time.
    fn write_points(&mut self) {
        let frame = Frame {
            time: self.pulse.time(),
            scale: self.pulse.scale(),
            amplitude: self.pulse.amplitude(),
            config: &self.config,
        };

        for (particle, point) in self.particles.iter_mut().zip(self.points.iter_mut()) {
            let (position, alpha) = match particle.phase() {
                Phase::Live(breathing) => {
                    let alpha = breathing.alpha(
                        frame.time,
                        frame.config.pulse.frequency,
                        frame.config.breath_exponent,
                    );
                    (frame.live_position(particle, alpha), alpha)
                }
                Phase::Frozen(frozen) => (
                    frame.frozen_position(particle, frozen),
                    frozen.fade.alpha_at(frame.time),
                ),
            };
            particle.set_alpha(alpha);
            *point = SpherePoint::new(position, alpha);
        }
    }

    // ========== Accessors ==========

    /// Field configuration.
    pub fn config(&self) -> &SphereConfig {
        &self.config
    }

    /// Global pulse state.
    pub fn pulse(&self) -> &Pulse {
        &self.pulse
    }

    /// Elapsed simulation time in seconds.
    #[inline]
    pub fn time(&self) -> f32 {
        self.pulse.time()
    }

    /// Number of pulses fired so far.
    #[inline]
    pub fn pulse_count(&self) -> u32 {
        self.pulse.count()
    }

    /// All particles, in snapshot order.
    pub fn particles(&self) -> &[SphereParticle] {
        &self.particles
    }

    /// Number of frozen particles.
    pub fn frozen_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_frozen()).count()
    }

    /// Number of particles still live.
    pub fn live_count(&self) -> usize {
        self.particles.len() - self.frozen_count()
    }

    /// Particle count asked for at construction.
    pub fn requested_count(&self) -> usize {
        self.requested
    }

    /// Last recorded drawing surface.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

impl ParticleField for SphereParticleField {
    type Point = SpherePoint;

    fn advance(&mut self, dt: f32) {
        let dt = sanitize_dt(dt);
        if let Some(ordinal) = self.pulse.advance(dt) {
            self.freeze_batch(ordinal);
        }
        self.write_points();
    }

    fn resize_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
    }

    fn snapshot(&self) -> &[SpherePoint] {
        &self.points
    }
}

/// Rejection-sample up to `count` rim-biased points on the unit sphere.
fn sample_particles(count: usize, config: &SphereConfig, sampler: &mut Sampler) -> Vec<SphereParticle> {
    let max_attempts = count.saturating_mul(config.attempts_per_point as usize);
    let mut particles = Vec::with_capacity(count);
    let mut attempts = 0;

    while particles.len() < count && attempts < max_attempts {
        attempts += 1;

        let home = sampler.on_unit_sphere();
        // Projected radius: 0 at the center of the disk, 1 at the rim
        let r = home.truncate().length();
        if !sampler.chance(config.rim_acceptance(r)) {
            continue;
        }

        let wiggle_phase = sampler.phases();
        let breathing = Breathing {
            fades: sampler.chance(config.fade_probability),
            phase: sampler.phase(),
        };
        particles.push(SphereParticle::new(home, wiggle_phase, breathing));
    }

    if particles.len() < count {
        debug!(
            requested = count,
            sampled = particles.len(),
            attempts,
            "Sampling budget exhausted"
        );
    }
    particles
}

/// Values shared by every particle in one frame.
struct Frame<'a> {
    time: f32,
    /// Live sphere scale, `base_scale · pulse_scale`.
    scale: f32,
    /// `pulse_scale − 1`.
    amplitude: f32,
    config: &'a SphereConfig,
}

impl Frame<'_> {
    fn live_position(&self, particle: &SphereParticle, alpha: f32) -> Vec3 {
        let home = particle.home();
        let phase = particle.wiggle_phase();
        let t = self.time;

        let wiggled = match self.config.wiggle {
            WiggleModel::Angular {
                theta_amplitude,
                phi_amplitude,
            } => {
                let theta = home.y.atan2(home.x) + theta_amplitude * (t + phase.x).sin();
                let phi = home.z.clamp(-1.0, 1.0).acos() + phi_amplitude * (t + phase.y).cos();
                Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos())
            }
            WiggleModel::Spring {
                breathe_gain,
                spring_gain,
                orbit_gain,
            } => {
                let spring = (t * self.config.pulse.frequency + home.length() * 6.0).sin();
                let radial = (breathe_gain + spring_gain * spring) * self.amplitude;

                let noise = (t * 1.5 + home.x * 7.0 + home.y * 13.0 + home.z * 5.0).sin();
                let orbit = orbit_gain * noise * (1.0 - alpha * 0.7);
                let swirl = Vec3::new(
                    (t + home.y + home.z).cos(),
                    (t + home.x + home.z).sin(),
                    (t + home.x + home.y).sin(),
                );

                home + unit_or_zero(home) * radial + swirl * orbit
            }
        };

        wiggled * self.scale
    }

    fn frozen_position(&self, particle: &SphereParticle, frozen: &Frozen) -> Vec3 {
        let phase = particle.wiggle_phase();
        let t = self.time;

        let elapsed = (t - frozen.frozen_at).max(0.0);
        let distance = frozen.ejection.distance(elapsed, self.config.ejection_ramp);
        let ejected = particle.home() * frozen.scale + frozen.ejection.direction * distance;

        let shimmer = (t * 20.0 + phase.x * 13.7).sin() * FROZEN_SHIMMER;
        let drift = Vec3::new(
            (t * 2.1 + phase.x + shimmer).sin(),
            (t * 2.7 + phase.y).cos(),
            (t * 1.9 + phase.z).sin(),
        );

        ejected + drift * self.config.frozen_wiggle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FreezePolicy;

    fn seeded(count: usize, config: SphereConfig) -> SphereParticleField {
        SphereParticleField::with_sampler(count, config, Sampler::from_seed(42))
    }

    /// Advance until the next pulse fires. Returns `false` if none did.
    fn run_to_next_pulse(field: &mut SphereParticleField) -> bool {
        let start = field.pulse_count();
        for _ in 0..1000 {
            field.advance(0.02);
            if field.pulse_count() > start {
                return true;
            }
        }
        false
    }

    #[test]
    fn test_homes_on_unit_sphere() {
        let field = seeded(1000, SphereConfig::breathing());
        assert_eq!(field.len(), 1000);
        for p in field.particles() {
            assert!((p.home().length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_snapshot_ready_before_first_advance() {
        let field = seeded(100, SphereConfig::breathing());
        assert_eq!(field.snapshot().len(), field.particles().len());
        assert_eq!(field.as_floats().len(), field.len() * 4);
        assert!(field.as_floats().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_empty_field_is_valid() {
        let mut field = seeded(0, SphereConfig::breathing());
        assert!(field.is_empty());
        for _ in 0..200 {
            field.advance(0.02);
        }
        assert!(field.snapshot().is_empty());
        assert!(field.pulse_count() > 0);
    }

    #[test]
    fn test_budget_exhaustion_yields_fewer_points() {
        // Only the exact rim is accepted with a zero floor and a huge exponent
        let config = SphereConfig::breathing()
            .with_acceptance_floor(0.0)
            .with_bias_power(10_000.0);
        let field = seeded(500, config);
        assert!(field.len() < 500);
        assert_eq!(field.requested_count(), 500);
        assert_eq!(field.snapshot().len(), field.len());
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let mut field = seeded(50, SphereConfig::breathing());
        field.advance(0.5);
        let time = field.time();
        field.advance(-3.0);
        field.advance(f32::NAN);
        assert_eq!(field.time(), time);
    }

    #[test]
    fn test_first_pulse_freezes_half() {
        let mut field = seeded(1000, SphereConfig::breathing());
        assert!(run_to_next_pulse(&mut field));
        assert_eq!(field.pulse_count(), 1);
        assert_eq!(field.frozen_count(), 500);
        for p in field.particles().iter().filter(|p| p.is_frozen()) {
            let frozen = p.frozen().unwrap();
            assert_eq!(frozen.pulse, 1);
            assert!(frozen.ejection.speed > 0.0);
            let delay = frozen.fade.start - frozen.frozen_at;
            assert!(delay > 0.2 - 1e-4 && delay < 3.2 + 1e-4, "delay = {}", delay);
        }
    }

    #[test]
    fn test_freeze_partition_and_monotonic() {
        let mut field = seeded(800, SphereConfig::breathing());
        for _ in 0..8 {
            let before: Vec<bool> = field.particles().iter().map(|p| p.is_frozen()).collect();
            if !run_to_next_pulse(&mut field) {
                break;
            }
            let after: Vec<bool> = field.particles().iter().map(|p| p.is_frozen()).collect();

            let eligible = before.iter().filter(|f| !**f).count();
            let expected = FreezePolicy::HalfOrAll.freeze_count(eligible, field.requested_count());
            let newly = before.iter().zip(&after).filter(|(b, a)| !**b && **a).count();
            assert_eq!(newly, expected);

            // Nothing ever thaws
            assert!(before.iter().zip(&after).all(|(b, a)| !*b || *a));
        }
    }

    #[test]
    fn test_small_remainder_freezes_entirely() {
        let mut field = seeded(800, SphereConfig::breathing());
        // Halving 800: 400, 200, 100 left; then half (50) < 800/8 so all go
        for _ in 0..4 {
            assert!(run_to_next_pulse(&mut field));
        }
        assert_eq!(field.live_count(), 0);
    }

    #[test]
    fn test_freeze_ratios_use_requested_count() {
        // Only points right at the rim survive, so the budget runs out early
        let sparse = SphereConfig::breathing()
            .with_acceptance_floor(0.0)
            .with_bias_power(10_000.0);

        let mut field = seeded(800, sparse.clone());
        let sampled = field.len();
        assert!(sampled > 0 && sampled < 190, "sampled = {}", sampled);
        assert!(run_to_next_pulse(&mut field));
        // Half of the sampled points is below 800 / 8, so everything goes
        assert_eq!(field.frozen_count(), sampled);

        let mut field = seeded(800, sparse.with_freeze_policy(FreezePolicy::Fixed { fraction: 0.05 }));
        assert!(field.len() >= 40);
        assert!(run_to_next_pulse(&mut field));
        assert_eq!(field.frozen_count(), 40);
    }

    #[test]
    fn test_fixed_policy_freezes_eighth() {
        let mut field = seeded(800, SphereConfig::spring());
        assert!(run_to_next_pulse(&mut field));
        assert_eq!(field.frozen_count(), 100);
        assert!(run_to_next_pulse(&mut field));
        assert_eq!(field.frozen_count(), 200);
    }

    #[test]
    fn test_live_points_follow_scale() {
        let config = SphereConfig::breathing().with_wiggle(WiggleModel::Angular {
            theta_amplitude: 0.0,
            phi_amplitude: 0.0,
        });
        let mut field = seeded(200, config);
        field.advance(0.1);
        let scale = field.pulse().scale();
        for (p, point) in field.particles().iter().zip(field.snapshot()) {
            assert!(!p.is_frozen());
            assert!((point.position().length() - scale).abs() < 1e-4);
        }
    }

    #[test]
    fn test_frozen_alpha_reaches_zero() {
        let mut field = seeded(300, SphereConfig::breathing());
        assert!(run_to_next_pulse(&mut field));
        // Longest fade ends 3.2 + 4.6 seconds after the freeze
        for _ in 0..((8.0 / 0.02) as usize + 10) {
            field.advance(0.02);
        }
        let first_batch: Vec<_> = field
            .particles()
            .iter()
            .filter(|p| p.frozen().map(|f| f.pulse) == Some(1))
            .collect();
        assert!(!first_batch.is_empty());
        for p in first_batch {
            assert_eq!(p.alpha(), 0.0);
        }
    }

    #[test]
    fn test_frozen_points_move_outward() {
        let config = SphereConfig::breathing().with_fade(100.0..100.0, 1.0..1.0);
        let mut field = seeded(300, SphereConfig { frozen_wiggle: 0.0, ..config });
        assert!(run_to_next_pulse(&mut field));
        // Past the 1.5s ramp, before the second pulse
        for _ in 0..80 {
            field.advance(0.02);
        }
        for (p, point) in field.particles().iter().zip(field.snapshot()) {
            if let Some(frozen) = p.frozen() {
                let expected = frozen.scale + frozen.ejection.speed;
                assert!((point.position().length() - expected).abs() < 1e-4);
                assert_eq!(point.alpha, 1.0);
            }
        }
    }

    #[test]
    fn test_spring_wiggle_stays_finite() {
        let mut field = seeded(400, SphereConfig::spring());
        for _ in 0..600 {
            field.advance(0.02);
            assert!(field.as_floats().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_spring_radial_offset() {
        let wiggle = WiggleModel::Spring {
            breathe_gain: 0.25,
            spring_gain: 0.2,
            orbit_gain: 0.0,
        };
        let mut field = seeded(200, SphereConfig::spring().with_wiggle(wiggle));
        // Before the first pulse, so every point is live
        field.advance(0.1);

        let t = field.time();
        let pulse = field.pulse();
        let frequency = pulse.config().frequency;
        let radial = (0.25 + 0.2 * (t * frequency + 6.0).sin()) * pulse.amplitude();
        let expected = (1.0 + radial) * pulse.scale();
        assert!(radial.abs() > 1e-3);

        for (p, point) in field.particles().iter().zip(field.snapshot()) {
            assert!(!p.is_frozen());
            let position = point.position();
            assert!((position.length() - expected).abs() < 1e-4);
            assert!(position.normalize().dot(p.home()) > 1.0 - 1e-4);
        }
    }

    #[test]
    fn test_resize_viewport() {
        let mut field = seeded(10, SphereConfig::breathing());
        field.resize_viewport(800, 400);
        assert_eq!(field.viewport().aspect_ratio(), 2.0);
    }
}
