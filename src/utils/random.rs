//! Random numbers and strings, e.g. for request payload fixtures.

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Default alphabet: ASCII letters, digits and common symbols.
pub const DEFAULT_LETTERS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ!@#$%^&*()_+1234567890";

/// Alphanumeric alphabet.
pub const ALPHANUMERIC: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random integers in an inclusive range and strings drawn from a fixed alphabet.
#[derive(Debug, Clone)]
pub struct RandomSource<R: Rng> {
    rng: R,
    letters: Vec<char>,
}

impl RandomSource<ThreadRng> {
    /// Thread-local CSPRNG with the default alphabet.
    pub fn new() -> Self {
        Self::from_rng(rand::rng())
    }
}

impl Default for RandomSource<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource<StdRng> {
    /// Deterministic source for reproducible fixtures.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource<R> {
    pub fn from_rng(rng: R) -> Self {
        Self {
            rng,
            letters: DEFAULT_LETTERS.chars().collect(),
        }
    }

    /// Replaces the alphabet. An empty alphabet keeps the current one.
    pub fn with_letters(mut self, letters: &str) -> Self {
        if !letters.is_empty() {
            self.letters = letters.chars().collect();
        }
        self
    }

    /// Uniform integer in `[min, max]`; reversed bounds are swapped.
    pub fn num(&mut self, min: i64, max: i64) -> i64 {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        self.rng.random_range(low..=high)
    }

    /// String of `len` characters drawn uniformly from the alphabet.
    pub fn string(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| self.letters[self.rng.random_range(0..self.letters.len())])
            .collect()
    }
}
