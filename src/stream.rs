//! The falling stream field.
//!
//! Points fall down a vertical column at individual speeds and wrap back to
//! the top once they pass the bottom. The column is drawn as a funnel:
//! narrow at the top, wider toward the bottom.

use crate::config::StreamConfig;
use crate::field::{sanitize_dt, ParticleField, Viewport};
use crate::points::StreamPoint;
use crate::spawn::Sampler;
use glam::Vec3;
use tracing::debug;

/// One point of a [`StreamParticleField`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamParticle {
    position: Vec3,
    fall_speed: f32,
}

impl StreamParticle {
    /// Untapered position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Fall distance per reference frame.
    #[inline]
    pub fn fall_speed(&self) -> f32 {
        self.fall_speed
    }
}

/// A column of falling, recycled points.
#[derive(Debug, Clone)]
pub struct StreamParticleField {
    config: StreamConfig,
    particles: Vec<StreamParticle>,
    points: Vec<StreamPoint>,
    viewport: Viewport,
    time: f32,
}

impl StreamParticleField {
    /// Field of `count` points with the default config.
    pub fn new(count: usize) -> Self {
        Self::with_config(count, StreamConfig::default())
    }

    /// Field of `count` points with the given config.
    pub fn with_config(count: usize, config: StreamConfig) -> Self {
        Self::with_sampler(count, config, Sampler::new())
    }

    /// Field of `count` points drawing randomness from `sampler`.
    ///
    /// Initial heights are staggered evenly from the top so the first frame
    /// shows no clumping. The stagger never reaches below `bottom`.
    pub fn with_sampler(count: usize, config: StreamConfig, mut sampler: Sampler) -> Self {
        let stagger = config.spawn_span.min(config.span()).max(0.0);
        let spacing = if count > 0 {
            stagger / count as f32
        } else {
            0.0
        };

        let particles: Vec<StreamParticle> = (0..count)
            .map(|i| StreamParticle {
                position: Vec3::new(
                    sampler.random_in(&(-1.0..1.0)),
                    config.top - i as f32 * spacing,
                    0.0,
                ),
                fall_speed: sampler.random_in(&config.fall_speed),
            })
            .collect();
        debug!(count, "Stream field created");

        let mut field = Self {
            points: vec![StreamPoint::default(); particles.len()],
            particles,
            config,
            viewport: Viewport::default(),
            time: 0.0,
        };
        field.write_points();
        field
    }

    fn write_points(&mut self) {
        let config = &self.config;
        for (particle, point) in self.particles.iter().zip(self.points.iter_mut()) {
            let p = particle.position;
            let x = p.x * config.taper_at(p.y);
            *point = StreamPoint::new(Vec3::new(x, p.y, p.z));
        }
    }

    // ========== Accessors ==========

    /// Field configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// All particles, in snapshot order.
    pub fn particles(&self) -> &[StreamParticle] {
        &self.particles
    }

    /// Elapsed simulation time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Last recorded drawing surface.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

impl ParticleField for StreamParticleField {
    type Point = StreamPoint;

    /// Fall speeds are per reference frame, so a `dt` of one
    /// `frame_reference` moves each point by exactly its speed.
    fn advance(&mut self, dt: f32) {
        let dt = sanitize_dt(dt);
        self.time += dt;

        let frames = dt / self.config.frame_reference;
        let bottom = self.config.bottom;
        let span = self.config.span();

        for particle in &mut self.particles {
            let y = &mut particle.position.y;
            *y -= particle.fall_speed * frames;
            if *y < bottom {
                *y += span;
                // One step overshot more than a whole column
                if *y < bottom {
                    *y = bottom + (*y - bottom).rem_euclid(span);
                }
            }
        }

        self.write_points();
    }

    fn resize_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
    }

    fn snapshot(&self) -> &[StreamPoint] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(count: usize) -> StreamParticleField {
        StreamParticleField::with_sampler(count, StreamConfig::default(), Sampler::from_seed(9))
    }

    #[test]
    fn test_initial_layout() {
        let field = seeded(100);
        assert_eq!(field.len(), 100);
        assert_eq!(field.as_floats().len(), 300);

        let config = field.config().clone();
        for (i, p) in field.particles().iter().enumerate() {
            let expected_y = config.top - i as f32 * config.spawn_span / 100.0;
            assert!((p.position().y - expected_y).abs() < 1e-5);
            assert!((-1.0..1.0).contains(&p.position().x));
            assert_eq!(p.position().z, 0.0);
            assert!(config.fall_speed.contains(&p.fall_speed()));
        }
    }

    #[test]
    fn test_reference_frame_moves_by_speed() {
        let mut field = seeded(10);
        let before: Vec<f32> = field.particles().iter().map(|p| p.position().y).collect();
        let reference = field.config().frame_reference;
        field.advance(reference);
        for (p, y0) in field.particles().iter().zip(before) {
            assert!((p.position().y - (y0 - p.fall_speed())).abs() < 1e-6);
        }
    }

    #[test]
    fn test_taper_applied_to_snapshot() {
        let field = seeded(50);
        for (p, point) in field.particles().iter().zip(field.snapshot()) {
            let taper = field.config().taper_at(p.position().y);
            assert!((point.position[0] - p.position().x * taper).abs() < 1e-6);
            assert_eq!(point.position[1], p.position().y);
        }
    }

    #[test]
    fn test_huge_step_stays_in_bounds() {
        let mut field = seeded(20);
        field.advance(1000.0);
        let config = field.config().clone();
        for p in field.particles() {
            let y = p.position().y;
            assert!(y >= config.bottom && y <= config.top, "y = {}", y);
        }
    }

    #[test]
    fn test_oversized_stagger_stays_in_column() {
        let config = StreamConfig {
            spawn_span: 10.0,
            ..StreamConfig::default()
        };
        let field = StreamParticleField::with_sampler(10, config.clone(), Sampler::from_seed(9));
        for point in field.snapshot() {
            let y = point.position[1];
            assert!(y >= config.bottom && y <= config.top, "y = {}", y);
        }
    }

    #[test]
    fn test_empty_field() {
        let mut field = seeded(0);
        field.advance(0.1);
        assert!(field.is_empty());
    }
}
