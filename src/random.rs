//! Random sources for the validator's chance rules and recipe templates
//!
//! The validator never touches an ambient generator; it draws from an
//! injected `RandomSource` so tests can force every branch.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send {
    /// Next uniform value in `[0, 1)`
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        let scaled = (self.next_f64() * len as f64) as usize;
        scaled.min(len.saturating_sub(1))
    }
}

/// Seedable pseudo-random source backed by `StdRng`.
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Deterministic sequence for a given seed
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed from operating system entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted.
///
/// Used to pin down chance-based outcomes in tests.
#[derive(Debug, Clone)]
pub struct FixedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl FixedRandom {
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "FixedRandom needs at least one value");
        Self { values, cursor: 0 }
    }

    /// Always returns the same value
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of draws taken so far
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for FixedRandom {
    fn next_f64(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
