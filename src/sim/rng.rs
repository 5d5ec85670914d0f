//! Randomness consumed by the spawner
//!
//! The simulation only needs a uniform value in [0, 1) and an index in [0, n).
//! Sessions use a seeded `Pcg32`; tests can script exact sequences.

use rand::Rng;
use rand_pcg::Pcg32;

pub trait RandomSource {
    /// Uniform value in [0, 1)
    fn next_unit(&mut self) -> f32;
    /// Uniform index in [0, upper). `upper` must be non-zero.
    fn next_index(&mut self, upper: usize) -> usize;
}

impl RandomSource for Pcg32 {
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }

    fn next_index(&mut self, upper: usize) -> usize {
        debug_assert!(upper > 0);
        self.random_range(0..upper.max(1))
    }
}
