//! Outbound notices to workers.

use aco_core::{Cycle, Tick};

/// What the colony tells its workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// A new tick began; every live worker is expected to respond.
    TimeAdvanced(Tick),
    /// A cycle closed and every worker is back at the start node.
    NewCycle(Cycle),
}

/// Delivers notices to workers.
///
/// `publish` is called while the coordinator holds its response lock, so it
/// must not block on, or call back into, the colony.  Queueing the notice
/// (for example on an unbounded channel) is the expected implementation.
pub trait NoticeSink: Send + Sync {
    fn publish(&self, notice: Notice);
}

impl<F> NoticeSink for F
where
    F: Fn(Notice) + Send + Sync,
{
    fn publish(&self, notice: Notice) {
        self(notice)
    }
}

/// Drops every notice.
pub struct NoopSink;

impl NoticeSink for NoopSink {
    fn publish(&self, _notice: Notice) {}
}
