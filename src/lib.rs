//! # pointcloud - animated point-cloud simulations
//!
//! CPU-side particle simulations for two point-cloud effects, producing a
//! flat attribute buffer per frame that a renderer draws as point sprites.
//!
//! pointcloud does no drawing itself. A render loop owns one field, feeds it a
//! frame delta and uploads whatever [`ParticleField::snapshot`] returns.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pointcloud::prelude::*;
//!
//! let mut field = SphereParticleField::new(2000);
//! let mut clock = FrameClock::new();
//!
//! loop {
//!     field.advance(clock.tick());
//!     let floats: &[f32] = field.as_floats(); // x, y, z, alpha per point
//!     upload_vertices(floats);
//! }
//! ```
//!
//! ## Fields
//!
//! | Field | Points | Snapshot |
//! |-------|--------|----------|
//! | [`SphereParticleField`] | rim-biased samples on the unit sphere | [`SpherePoint`] `(x, y, z, alpha)` |
//! | [`StreamParticleField`] | a falling, tapered column | [`StreamPoint`] `(x, y, z)` |
//!
//! ### Sphere
//!
//! The sphere shrinks linearly while breathing around its size. Each time the
//! breathing signal peaks, a batch of live points is frozen and ejected
//! outward; ejected points drift and fade on their own schedule. See
//! [`lifecycle`] for the per-particle state machine and [`config`] for every
//! tunable, including the [`SphereConfig::breathing`] and
//! [`SphereConfig::spring`] presets.
//!
//! ### Stream
//!
//! Points fall at individual speeds and wrap to the top of the column,
//! keeping their spacing. The output is narrow at the top and wide at the
//! bottom.
//!
//! ## Randomness
//!
//! Each field owns one [`Sampler`]. Construct through `with_sampler` and
//! [`Sampler::from_seed`] for reproducible runs.

pub mod config;
mod error;
pub mod field;
pub mod lifecycle;
mod points;
pub mod pulse;
mod spawn;
mod sphere;
mod stream;
pub mod time;

pub use bytemuck;
pub use config::{FreezePolicy, PulseConfig, SceneConfig, SphereConfig, StreamConfig, WiggleModel};
pub use error::{ConfigError, LoadError};
pub use field::{ParticleField, Viewport};
pub use glam::Vec3;
pub use lifecycle::{Phase, SphereParticle};
pub use points::{SpherePoint, StreamPoint};
pub use pulse::Pulse;
pub use spawn::Sampler;
pub use sphere::SphereParticleField;
pub use stream::{StreamParticle, StreamParticleField};
pub use time::FrameClock;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use pointcloud::prelude::*;
/// ```
///
/// This imports:
/// - [`SphereParticleField`], [`StreamParticleField`] - the two simulations
/// - [`ParticleField`] - the trait a render loop drives them through
/// - [`SphereConfig`], [`StreamConfig`], [`SceneConfig`] - configuration
/// - [`FrameClock`] - frame delta source
/// - [`Vec3`] - glam vector type
pub mod prelude {
    pub use crate::config::{
        FreezePolicy, PulseConfig, SceneConfig, SphereConfig, StreamConfig, WiggleModel,
    };
    pub use crate::field::{ParticleField, Viewport};
    pub use crate::points::{SpherePoint, StreamPoint};
    pub use crate::spawn::Sampler;
    pub use crate::sphere::SphereParticleField;
    pub use crate::stream::StreamParticleField;
    pub use crate::time::FrameClock;
    pub use glam::Vec3;
}
