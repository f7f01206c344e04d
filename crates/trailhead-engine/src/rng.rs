//! Random source abstraction for determinism.
//!
//! Event triggering and selection consume values in `[0.0, 1.0)` from a
//! [`RandomSource`] owned by the engine. In production this wraps the
//! thread-local RNG; tests inject a scripted implementation to force or
//! suppress event triggers deterministically.

use rand::Rng;

/// Abstraction over random number generation.
pub trait RandomSource: Send {
    /// Generate a random `f64` in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;
}

/// Production random source backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandomSource;

impl ThreadRandomSource {
    /// Create a new thread-local random source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl RandomSource for ThreadRandomSource {
    fn next_f64(&mut self) -> f64 {
        rand::rng().random()
    }
}

/// Scripted random source replaying a fixed sequence of values.
///
/// Once the sequence is exhausted the last value repeats, so a single-value
/// sequence behaves as a constant source (e.g. `1.0 - f64::EPSILON` never
/// triggers an event, `0.0` always triggers and selects the first eligible
/// event).
#[derive(Debug, Clone)]
pub struct SequenceRandomSource {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRandomSource {
    /// Create a scripted source from a value sequence.
    ///
    /// An empty sequence behaves as a constant `0.0`.
    #[must_use]
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Create a constant source that always yields `value`.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceRandomSource {
    fn next_f64(&mut self) -> f64 {
        let value = self
            .values
            .get(self.cursor)
            .or_else(|| self.values.last())
            .copied()
            .unwrap_or(0.0);
        self.cursor = self.cursor.saturating_add(1);
        value
    }
}
