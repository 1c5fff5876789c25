//! Uniform random sources for the weighted draw.
//!
//! The engine only needs one uniform value in `[0, 1)` per draw. Sources
//! are injected so simulations can be replayed from a seed and tests can
//! pin exact values.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform values in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// Thread-local RNG. The default for production draws.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn next_unit(&self) -> f64 {
        rand::thread_rng().gen()
    }
}

/// Reproducible RNG seeded from a `u64`.
#[derive(Debug)]
pub struct SeededSource {
    rng: Mutex<StdRng>,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededSource {
    fn next_unit(&self) -> f64 {
        // A poisoned lock still holds a usable generator.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen()
    }
}

/// Cycles through a fixed list of values. Intended for tests.
#[derive(Debug)]
pub struct SequenceSource {
    values: Vec<f64>,
    index: AtomicUsize,
}

impl SequenceSource {
    /// Values are clamped into `[0, 1)`. An empty list behaves as `[0.0]`.
    pub fn new(values: Vec<f64>) -> Self {
        let values = if values.is_empty() { vec![0.0] } else { values };
        Self {
            values: values.into_iter().map(|v| v.clamp(0.0, 0.999_999_999)).collect(),
            index: AtomicUsize::new(0),
        }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceSource {
    fn next_unit(&self) -> f64 {
        let idx = self.index.fetch_add(1, Ordering::SeqCst);
        self.values[idx % self.values.len()]
    }
}
