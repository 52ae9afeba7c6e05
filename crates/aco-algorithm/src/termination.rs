use std::fmt;

/// Why the colony stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// Every path reported in a cycle was identical.
    Stagnation,
    /// The configured number of cycles has closed.
    CyclesExhausted,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TerminationReason::Stagnation      => "stagnated behaviour",
            TerminationReason::CyclesExhausted => "cycles exhausted",
        })
    }
}
