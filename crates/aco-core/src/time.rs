//! Discrete time counters.
//!
//! A [`Tick`] is one global synchronous step: every live worker is asked for
//! a response, queued actions run, and the algorithm folds the results in.
//! A [`Cycle`] groups the ticks between two boundaries (an iteration in which
//! no worker moved).  Ticks start at 1 when the first tick fires; cycles start
//! at 1 when the colony is built.

use std::fmt;
use std::ops::Add;

// ── Tick ──────────────────────────────────────────────────────────────────────

/// Number of ticks fired since the colony started.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── Cycle ─────────────────────────────────────────────────────────────────────

/// Algorithm cycle number.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cycle(pub u32);

impl Cycle {
    pub const FIRST: Cycle = Cycle(1);

    #[inline]
    pub fn next(self) -> Cycle {
        Cycle(self.0 + 1)
    }

    #[inline]
    pub fn is_first(self) -> bool {
        self == Cycle::FIRST
    }
}

impl Default for Cycle {
    fn default() -> Self {
        Cycle::FIRST
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle {}", self.0)
    }
}
