//! Per-frame attribute buffers.
//!
//! These are the only thing a renderer reads from a field. Both layouts are
//! `#[repr(C)]` and `Pod`, so a whole frame can be handed to a vertex buffer
//! upload as bytes or as a flat `&[f32]` without copying.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Sphere point attributes: position and transparency (16 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpherePoint {
    /// World-space position.
    pub position: [f32; 3],
    /// Transparency in `[0, 1]`.
    pub alpha: f32,
}

impl SpherePoint {
    /// Pack a position and alpha.
    #[inline]
    pub fn new(position: Vec3, alpha: f32) -> Self {
        Self {
            position: position.to_array(),
            alpha,
        }
    }

    /// Position as a vector.
    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Stream point attributes: position only (12 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct StreamPoint {
    /// World-space position, horizontally tapered.
    pub position: [f32; 3],
}

impl StreamPoint {
    /// Pack a position.
    #[inline]
    pub fn new(position: Vec3) -> Self {
        Self {
            position: position.to_array(),
        }
    }

    /// Position as a vector.
    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}
