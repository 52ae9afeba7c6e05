//! Error types for aco-sync.
//!
//! Timeouts and interruptions are not errors here: they are reported through
//! [`ResponseReport`](crate::ResponseReport) and
//! [`BarrierOutcome`](crate::BarrierOutcome) and logged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("a response wait is already active")]
    ResponseWaitActive,

    #[error("an initial-arrival wait is already in flight")]
    ArrivalWaitInFlight,

    #[error("the tick clock was stopped and cannot be restarted")]
    ClockStopped,

    #[error("failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("failed to build action pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

pub type SyncResult<T> = Result<T, SyncError>;
