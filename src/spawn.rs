//! Random sampling for particle initialization and freeze events.
//!
//! Every field owns exactly one [`Sampler`]. It wraps a small, fast RNG and
//! provides the handful of distributions the simulations need.
//!
//! ```ignore
//! // Reproducible field for tests and benchmarks
//! let field = SphereParticleField::with_sampler(
//!     1000,
//!     SphereConfig::breathing(),
//!     Sampler::from_seed(7),
//! );
//! ```

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use std::ops::Range;

/// Per-field random source.
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: SmallRng,
}

impl Sampler {
    /// Sampler seeded from OS entropy. Different every run.
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Sampler with a fixed seed, for reproducible runs.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ========== Random primitives ==========

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `range`. A degenerate range yields its start.
    #[inline]
    pub fn random_in(&mut self, range: &Range<f32>) -> f32 {
        if range.end > range.start {
            self.rng.gen_range(range.clone())
        } else {
            range.start
        }
    }

    /// `true` with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.random() < p
    }

    /// Random angle in `[0, 2π)`.
    #[inline]
    pub fn phase(&mut self) -> f32 {
        self.random() * TAU
    }

    /// Three independent random angles.
    pub fn phases(&mut self) -> Vec3 {
        Vec3::new(self.phase(), self.phase(), self.phase())
    }

    // ========== Geometry ==========

    /// Uniform point on the unit sphere by inverse-CDF sampling.
    ///
    /// `θ = 2πu`, `φ = acos(2v − 1)`, so area density is uniform
    /// (no clustering at the poles).
    pub fn on_unit_sphere(&mut self) -> Vec3 {
        let u = self.random();
        let v = self.random();
        let theta = TAU * u;
        let phi = (2.0 * v - 1.0).clamp(-1.0, 1.0).acos();

        Vec3::new(
            phi.sin() * theta.cos(),
            phi.sin() * theta.sin(),
            phi.cos(),
        )
    }

    // ========== Selection ==========

    /// Choose `amount` distinct items uniformly, without replacement.
    ///
    /// Runs a partial Fisher-Yates shuffle, so cost is O(amount) rather than
    /// O(len). The chosen items are the returned prefix; their order is random.
    pub fn choose_distinct<'a, T>(&mut self, items: &'a mut [T], amount: usize) -> &'a [T] {
        let (chosen, _) = items.partial_shuffle(&mut self.rng, amount);
        chosen
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_unit_sphere_is_normalized() {
        let mut sampler = Sampler::from_seed(1);
        for _ in 0..1000 {
            let p = sampler.on_unit_sphere();
            assert!((p.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_random_in_degenerate_range() {
        let mut sampler = Sampler::from_seed(2);
        assert_eq!(sampler.random_in(&(0.5..0.5)), 0.5);
        let v = sampler.random_in(&(0.2..3.2));
        assert!((0.2..3.2).contains(&v));
    }

    #[test]
    fn test_phase_range() {
        let mut sampler = Sampler::from_seed(3);
        for _ in 0..1000 {
            let p = sampler.phase();
            assert!((0.0..TAU).contains(&p));
        }
    }

    #[test]
    fn test_choose_distinct_without_replacement() {
        let mut sampler = Sampler::from_seed(4);
        let mut items: Vec<usize> = (0..100).collect();
        let mut chosen = sampler.choose_distinct(&mut items, 30).to_vec();
        assert_eq!(chosen.len(), 30);
        chosen.sort_unstable();
        chosen.dedup();
        assert_eq!(chosen.len(), 30);
    }

    #[test]
    fn test_choose_distinct_caps_at_len() {
        let mut sampler = Sampler::from_seed(5);
        let mut items = vec![1, 2, 3];
        assert_eq!(sampler.choose_distinct(&mut items, 10).len(), 3);
    }

    #[test]
    fn test_choose_distinct_is_unbiased() {
        let mut sampler = Sampler::from_seed(6);
        let mut hits = [0u32; 10];
        for _ in 0..10_000 {
            let mut items: Vec<usize> = (0..10).collect();
            for &i in sampler.choose_distinct(&mut items, 3) {
                hits[i] += 1;
            }
        }
        // Expected 3000 each
        for &h in &hits {
            assert!((2700..3300).contains(&h), "hits = {:?}", hits);
        }
    }
}
