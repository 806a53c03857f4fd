//! Sphere particle lifecycle.
//!
//! A sphere particle is either **live**, orbiting its home point and
//! optionally breathing in and out of view, or **frozen**, ejected outward by
//! a pulse and fading away on its own schedule.
//!
//! ```text
//!   Live(Breathing) ──pulse──▶ Frozen { fade, ejection }
//! ```
//!
//! The transition happens at most once per particle and never reverts.

use glam::Vec3;

/// Vectors shorter than this normalize to zero.
pub const NORMALIZE_EPSILON: f32 = 1e-6;

/// Unit vector along `v`, or zero when `v` is too short to have a direction.
#[inline]
pub fn unit_or_zero(v: Vec3) -> Vec3 {
    let length = v.length();
    if length > NORMALIZE_EPSILON {
        v / length
    } else {
        Vec3::ZERO
    }
}

/// Alpha behavior of a live particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Breathing {
    /// Whether alpha pulses; otherwise the particle stays opaque.
    pub fades: bool,
    /// Offset into the breathing cycle, in radians.
    pub phase: f32,
}

impl Breathing {
    /// Alpha at `time`.
    ///
    /// `t = (sin(time·frequency + phase) + 1) / 2`, `alpha = 1 − t^exponent`.
    /// A high exponent keeps the particle opaque most of the cycle with a
    /// sharp dip near the crest.
    pub fn alpha(&self, time: f32, frequency: f32, exponent: f32) -> f32 {
        if !self.fades {
            return 1.0;
        }
        let t = ((time * frequency + self.phase).sin() + 1.0) * 0.5;
        (1.0 - t.clamp(0.0, 1.0).powf(exponent)).clamp(0.0, 1.0)
    }
}

/// Linear fade from 1 to 0 over `[start, start + duration]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeWindow {
    /// Absolute simulation time the fade begins.
    pub start: f32,
    /// Length of the fade in seconds.
    pub duration: f32,
}

impl FadeWindow {
    /// Alpha at `time`: 1 before the window, exactly 0 after it.
    pub fn alpha_at(&self, time: f32) -> f32 {
        let elapsed = time - self.start;
        if elapsed <= 0.0 {
            return 1.0;
        }
        if self.duration <= 0.0 || elapsed >= self.duration {
            return 0.0;
        }
        (1.0 - elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Absolute time the particle becomes fully transparent.
    #[inline]
    pub fn end(&self) -> f32 {
        self.start + self.duration.max(0.0)
    }
}

/// Outward motion of a frozen particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ejection {
    /// Unit vector away from the sphere center (zero for a degenerate home).
    pub direction: Vec3,
    /// Distance travelled once the ramp completes.
    pub speed: f32,
}

impl Ejection {
    /// Distance covered `elapsed` seconds after the freeze, ramping linearly
    /// from 0 to `speed` over `ramp` seconds.
    pub fn distance(&self, elapsed: f32, ramp: f32) -> f32 {
        let t = if ramp > 0.0 {
            (elapsed / ramp).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.speed * t
    }
}

/// State recorded when a pulse freezes a particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frozen {
    /// Ordinal of the pulse that froze the particle (first pulse is 1).
    pub pulse: u32,
    /// Simulation time of the freeze; ejection starts here too.
    pub frozen_at: f32,
    /// Live sphere scale at the moment of freezing.
    pub scale: f32,
    /// Fade-out schedule.
    pub fade: FadeWindow,
    /// Outward motion.
    pub ejection: Ejection,
}

/// Lifecycle phase of a sphere particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    /// Orbiting with the sphere.
    Live(Breathing),
    /// Ejected and fading.
    Frozen(Frozen),
}

/// One point of a [`SphereParticleField`](crate::SphereParticleField).
#[derive(Clone, Debug)]
pub struct SphereParticle {
    home: Vec3,
    wiggle_phase: Vec3,
    phase: Phase,
    alpha: f32,
}

impl SphereParticle {
    /// A live, opaque particle at `home`.
    pub fn new(home: Vec3, wiggle_phase: Vec3, breathing: Breathing) -> Self {
        Self {
            home,
            wiggle_phase,
            phase: Phase::Live(breathing),
            alpha: 1.0,
        }
    }

    /// Sampled position on the unit sphere. Never changes.
    #[inline]
    pub fn home(&self) -> Vec3 {
        self.home
    }

    /// Per-axis phase offsets decorrelating this particle's motion.
    #[inline]
    pub fn wiggle_phase(&self) -> Vec3 {
        self.wiggle_phase
    }

    /// Current lifecycle phase.
    #[inline]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Alpha written in the last frame.
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Whether a pulse has frozen this particle.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        matches!(self.phase, Phase::Frozen(_))
    }

    /// Freeze record, if frozen.
    pub fn frozen(&self) -> Option<&Frozen> {
        match &self.phase {
            Phase::Frozen(frozen) => Some(frozen),
            Phase::Live(_) => None,
        }
    }

    /// Move to the frozen phase. Returns `false` (and changes nothing) if
    /// the particle was already frozen.
    pub(crate) fn freeze(&mut self, frozen: Frozen) -> bool {
        if self.is_frozen() {
            return false;
        }
        self.phase = Phase::Frozen(frozen);
        self.alpha = 1.0;
        true
    }

    #[inline]
    pub(crate) fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }
}
