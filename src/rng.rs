//! # RandomNumberGenerator
//!
//! The `RandomNumberGenerator` struct wraps a seedable `StdRng` and exposes the
//! handful of draws the genetic operators need: uniform reals, Bernoulli flips,
//! uniform indices, shuffles and random bit strings.
//!
//! Every run owns its own generator, so independent runs can execute on
//! different threads without sharing state.
//!
//! ## Example
//!
//! ```rust
//! use evosel::rng::RandomNumberGenerator;
//!
//! let mut rng = RandomNumberGenerator::from_seed(7);
//! let bits = rng.random_bits(10);
//! assert_eq!(bits.len(), 10);
//!
//! let locus = rng.index(10);
//! assert!(locus < 10);
//! ```

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

/// A wrapper around the `rand` crate's `StdRng`.
#[derive(Clone, Debug)]
pub struct RandomNumberGenerator {
    pub rng: StdRng,
}

impl RandomNumberGenerator {
    /// Creates a new `RandomNumberGenerator` instance seeded from the system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a new `RandomNumberGenerator` instance with a specific seed.
    ///
    /// This is useful for reproducible runs, tests and benchmarks.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns a uniform value in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Returns a uniform value in `[from, to)`, or `from` when the range is empty.
    pub fn uniform_in(&mut self, from: f64, to: f64) -> f64 {
        if to > from {
            self.rng.gen_range(from..to)
        } else {
            from
        }
    }

    /// Returns `true` with probability `p`. Values outside `[0, 1]` are clamped.
    pub fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            false
        } else if p >= 1.0 {
            true
        } else {
            self.rng.gen_bool(p)
        }
    }

    /// Returns a uniform index in `[0, upper)`.
    ///
    /// # Panics
    ///
    /// Panics if `upper` is zero.
    pub fn index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }

    /// Shuffles a slice in place uniformly at random.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Returns `length` independent fair bits.
    pub fn random_bits(&mut self, length: usize) -> Vec<bool> {
        (0..length).map(|_| self.rng.gen_bool(0.5)).collect()
    }

    /// Derives an independent generator, e.g. one per parallel run.
    pub fn fork(&mut self) -> Self {
        Self::from_seed(self.rng.gen())
    }
}

impl Default for RandomNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}
