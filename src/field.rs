//! The contract between a simulation and the render loop driving it.
//!
//! A driver owns one field, and once per display refresh calls
//! [`ParticleField::advance`] followed by [`ParticleField::snapshot`]:
//!
//! ```ignore
//! let mut field = SphereParticleField::new(2000);
//! field.resize_viewport(1080, 2340);
//!
//! loop {
//!     field.advance(clock.tick());
//!     upload_vertices(field.as_floats());
//! }
//! ```

use bytemuck::Pod;

/// A fixed-size particle population advanced one frame at a time.
pub trait ParticleField {
    /// Attribute layout of one point in the snapshot.
    type Point: Pod;

    /// Advance the simulation by `dt` seconds.
    ///
    /// Negative or non-finite deltas advance by zero. Never blocks.
    fn advance(&mut self, dt: f32);

    /// Record the size of the surface the field is drawn on.
    fn resize_viewport(&mut self, width: u32, height: u32);

    /// Attributes of every point for the current frame, in stable order.
    fn snapshot(&self) -> &[Self::Point];

    /// The snapshot as a flat float sequence.
    fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(self.snapshot())
    }

    /// Number of points.
    fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether the field has no points.
    fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

/// Size of the drawing surface, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    /// Surface width.
    pub width: u32,
    /// Surface height.
    pub height: u32,
}

impl Viewport {
    /// A viewport of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, or 1.0 for a zero-height surface.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Clamp a frame delta to something the simulations can integrate.
#[inline]
pub(crate) fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.max(0.0)
    } else {
        0.0
    }
}
