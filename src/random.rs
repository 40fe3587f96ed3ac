//! Seeded random source
//!
//! Every randomized value in the simulation (spawn position, speeds, cut
//! delay, sound pitch) is drawn from one `RandomSource` so a session can be
//! replayed from its seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Bounded float/int generator over a PCG stream
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: Pcg32,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Uniform float in [min, max). Returns `min` for an empty range.
    pub fn float(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..max)
    }

    /// Uniform int in [min, max] inclusive. Returns `min` for an empty range.
    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    /// Fair coin flip
    pub fn coin(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }

    /// Either 1.0 or -1.0 with equal odds
    pub fn sign(&mut self) -> f32 {
        if self.coin() { 1.0 } else { -1.0 }
    }
}
