//! Uniform without-replacement candidate sampling
//!
//! A [`RandomPicker`] owns a snapshot of candidates taken from one
//! ranked-list fetch and hands them out one at a time in uniformly random
//! order. Each draw is uniform over the candidates still in the pool, and a
//! drawn candidate never comes back; once the pool is empty every further
//! draw reports exhaustion.
//!
//! The picker is deliberately not thread-safe: it belongs to exactly one
//! in-flight discovery attempt.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::models::Candidate;

/// Signalled when the candidate pool has been fully drained
///
/// This is expected control flow for the discovery engine (it triggers scope
/// widening), not a failure surfaced to the operator.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PickerError {
    #[error("No candidates left in the pool")]
    Exhausted,
}

/// Stateful without-replacement sampler over a candidate snapshot
pub struct RandomPicker {
    remaining: Vec<Candidate>,
    rng: ChaCha8Rng,
}

impl RandomPicker {
    /// Create a picker over a snapshot of candidates
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            remaining: candidates,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Create a deterministic picker for tests
    pub fn with_seed(candidates: Vec<Candidate>, seed: u64) -> Self {
        Self {
            remaining: candidates,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draw a uniformly random candidate from the remaining pool
    ///
    /// The index swap keeps removal O(1); order of the backing vector is
    /// irrelevant since every draw re-samples over what is left.
    pub fn draw(&mut self) -> Result<Candidate, PickerError> {
        if self.remaining.is_empty() {
            return Err(PickerError::Exhausted);
        }

        let index = self.rng.gen_range(0..self.remaining.len());
        Ok(self.remaining.swap_remove(index))
    }

    /// Number of candidates still in the pool
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}
