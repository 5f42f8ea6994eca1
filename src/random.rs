//! Random-selection capability for rules that pick among canned replies.
//!
//! Selection is injected instead of reaching for a global generator, so the
//! CLI can be seeded and tests can pin a choice.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// A source of uniformly distributed indices.
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`. Callers never pass `len == 0`.
    fn index(&self, len: usize) -> usize;
}

/// Backed by the thread-local generator; a fresh draw on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Deterministic generator seeded once; the same seed yields the same
/// sequence of picks.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        SeededRandom { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }
}

impl RandomSource for SeededRandom {
    fn index(&self, len: usize) -> usize {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner).gen_range(0..len)
    }
}

/// Pick one item uniformly; `None` for an empty list.
pub(crate) fn choose<'a>(source: &dyn RandomSource, items: &[&'a str]) -> Option<&'a str> {
    if items.is_empty() {
        return None;
    }
    items.get(source.index(items.len())).copied()
}
