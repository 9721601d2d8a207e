//! Concurrency-safe pseudo-random source.
//!
//! Every explorer owns (or shares) a [`ConcurrencySafeRng`]. Access goes
//! through a mutex, so an instance may be shared across concurrently running
//! annealer clones without data races. Clones normally receive an
//! independent generator via [`ConcurrencySafeRng::fork`], which keeps a
//! seeded scenario reproducible run by run.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// 2^53: the number of evenly spaced doubles available in `[0, 1]`.
const UNIT_RESOLUTION: u64 = 1 << 53;

/// Creates a deterministic generator from `seed`.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A mutex-guarded [`StdRng`].
#[derive(Debug)]
pub struct ConcurrencySafeRng {
    inner: Mutex<StdRng>,
}

impl ConcurrencySafeRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Mutex::new(create_rng(seed)),
        }
    }

    /// A generator seeded from the thread-local entropy source.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }

    /// Runs `f` with exclusive access to the underlying generator.
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Same as [`with_rng`](Self::with_rng), but hands out a trait object for
    /// collaborators that are not generic over the generator.
    pub fn with_dyn_rng<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        self.with_rng(|rng| f(rng))
    }

    /// Uniform draw from the closed interval `[0, 1]`.
    ///
    /// Both ends are reachable: an integer in `[0, 2^53)` is divided by
    /// `2^53 - 1`.
    pub fn random_unit(&self) -> f64 {
        self.with_rng(|rng| {
            let draw = rng.random_range(0..UNIT_RESOLUTION);
            draw as f64 / (UNIT_RESOLUTION - 1) as f64
        })
    }

    /// Uniform index in `[0, n)`. `n` must be positive.
    pub fn random_index(&self, n: usize) -> usize {
        debug_assert!(n > 0, "random_index requires a non-empty range");
        self.with_rng(|rng| rng.random_range(0..n))
    }

    /// Derives an independent generator, seeded from this one.
    pub fn fork(&self) -> Self {
        Self::seeded(self.with_rng(|rng| rng.random()))
    }

    /// A copy of the current generator state.
    pub fn snapshot(&self) -> StdRng {
        self.with_rng(|rng| rng.clone())
    }

    /// Rewinds to a state taken with [`snapshot`](Self::snapshot).
    pub fn restore(&self, state: StdRng) {
        self.with_rng(|rng| *rng = state);
    }
}

impl Default for ConcurrencySafeRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
