//! Sources of random indices for the computer opponent.
//!
//! The computer picks among the empty squares by drawing a single index.
//! Drawing goes through [`IndexSource`] so callers can seed it or script it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{instrument, trace};

/// Supplies indices uniformly distributed over `0..len`.
pub trait IndexSource {
    /// Draws an index in `0..len`. `len` is never zero.
    fn next_index(&mut self, len: usize) -> usize;
}

impl<S: IndexSource + ?Sized> IndexSource for &mut S {
    fn next_index(&mut self, len: usize) -> usize {
        (**self).next_index(len)
    }
}

impl<S: IndexSource + ?Sized> IndexSource for Box<S> {
    fn next_index(&mut self, len: usize) -> usize {
        (**self).next_index(len)
    }
}

/// Uniform draws from any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngIndex<R> {
    rng: R,
}

impl<R: Rng> RngIndex<R> {
    /// Wraps an existing generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngIndex<StdRng> {
    /// Generator seeded from operating system entropy.
    #[instrument]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible generator for a fixed seed.
    #[instrument]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> IndexSource for RngIndex<R> {
    fn next_index(&mut self, len: usize) -> usize {
        let index = self.rng.gen_range(0..len);
        trace!(len, index, "Drew random index");
        index
    }
}

/// Replays a fixed sequence of indices, cycling when exhausted.
///
/// Each scripted value is reduced modulo `len`, so a script never yields
/// an out-of-range index.
#[derive(Debug, Clone)]
pub struct ScriptedIndex {
    script: Vec<usize>,
    cursor: usize,
}

impl ScriptedIndex {
    /// Creates a source that returns `script` values in order.
    ///
    /// An empty script always yields zero.
    pub fn new(script: Vec<usize>) -> Self {
        Self { script, cursor: 0 }
    }

    /// Creates a source that always returns `index`.
    pub fn fixed(index: usize) -> Self {
        Self::new(vec![index])
    }
}

impl IndexSource for ScriptedIndex {
    fn next_index(&mut self, len: usize) -> usize {
        if self.script.is_empty() {
            return 0;
        }
        let value = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        value % len
    }
}
