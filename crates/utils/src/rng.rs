use bevy_ecs::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Seeded random source for everything the simulation rolls.
///
/// Every probability draw in the engine is a single `next_f32` sample in
/// `[0, 1)` compared against a configured chance.
#[derive(Resource, Clone, Debug)]
pub struct SimRng {
    inner: StdRng,
}

impl Default for SimRng {
    fn default() -> Self {
        Self::from_seed(0)
    }
}

impl SimRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform sample in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// `true` with probability `chance`. Out-of-range chances assert in debug
    /// builds and are clamped to `[0, 1]` otherwise.
    pub fn chance(&mut self, chance: f32) -> bool {
        debug_assert!((0.0..=1.0).contains(&chance), "chance {chance} outside [0, 1]");
        self.next_f32() < chance.clamp(0.0, 1.0)
    }

    /// Uniform float in `[min, max]`; returns `min` for an empty range.
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + (max - min) * self.next_f32()
    }

    /// Uniform integer in `[min, max)`; returns `min` for an empty range.
    pub fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        self.inner.gen_range(min..max)
    }

    /// Uniform integer in `[min, max]` (inclusive both ends).
    pub fn next_i32_inclusive(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.inner.gen_range(min..=max)
    }
}
