//! Deterministic per-worker RNG.
//!
//! # Determinism strategy
//!
//! Workers are named rather than numbered, so each `WorkerRng` is seeded by:
//!
//!   seed = global_seed XOR (hash(worker_name) * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio.
//! `DefaultHasher::new()` uses fixed keys, so the same name yields the same
//! seed within a build; workers joining late never disturb existing seeds.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::WorkerId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── WorkerRng ─────────────────────────────────────────────────────────────────

/// Per-worker deterministic RNG.  Owned by the worker's own thread.
pub struct WorkerRng(SmallRng);

impl WorkerRng {
    /// Seed deterministically from the run's global seed and a worker name.
    pub fn new(global_seed: u64, worker: &WorkerId) -> Self {
        let mut hasher = DefaultHasher::new();
        worker.as_str().hash(&mut hasher);
        let seed = global_seed ^ hasher.finish().wrapping_mul(MIXING_CONSTANT);
        WorkerRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for `rand` distributions and for
    /// [`CategoricalSampler::next`][crate::CategoricalSampler::next].
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }
}

