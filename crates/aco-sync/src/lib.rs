//! `aco-sync` — the concurrency primitives that turn independently paced
//! workers into one global synchronous tick.
//!
//! # One tick
//!
//! ```text
//! TickClock fires
//!   ① WorkerCoordinator::wait_for_responses — publish "time advanced" inside
//!      the wait's critical section, block until every live worker responded
//!      (or the timeout / cancellation hits)
//!   ② ActionBarrier::run_and_wait — execute every action queued during ①
//!      on the pool, wait for all of them (re-waiting past the deadline)
//!   ③ the caller folds the results into algorithm state
//! ```
//!
//! | Module          | Contents                                               |
//! |-----------------|--------------------------------------------------------|
//! | [`coordinator`] | `WorkerCoordinator`, `ResponseReport`                  |
//! | [`clock`]       | `TickClock`                                            |
//! | [`barrier`]     | `ActionBarrier`, `BarrierOutcome`, `WaitGroup`         |
//! | [`cancel`]      | `CancelToken`                                          |
//! | [`error`]       | `SyncError`, `SyncResult<T>`                           |
//!
//! Every blocking wait re-checks its predicate in bounded slices and observes
//! the shared [`CancelToken`], so no wait can block forever unnoticed.

pub mod barrier;
pub mod cancel;
pub mod clock;
pub mod coordinator;
pub mod error;

#[cfg(test)]
mod tests;

pub use barrier::{ActionBarrier, BarrierOutcome, WaitGroup};
pub use cancel::CancelToken;
pub use clock::TickClock;
pub use coordinator::{ResponseReport, WorkerCoordinator};
pub use error::{SyncError, SyncResult};

use std::any::Any;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Longest a blocking wait sleeps before re-checking cancellation.
pub(crate) const POLL_SLICE: Duration = Duration::from_millis(50);

/// Lock, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
