//! Per-tick action execution.
//!
//! Workers submit actions at any time; they accumulate in a queue until the
//! tick's barrier phase drains them onto a `rayon` pool and waits for all of
//! them.  A job that fails or panics is logged on its own and never aborts
//! the rest of the batch.

use std::fmt::Display;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, error, warn};

use crate::{CancelToken, POLL_SLICE, SyncResult, lock, panic_message};

type Job = Box<dyn FnOnce() -> Result<(), String> + Send + 'static>;

// ── WaitGroup ─────────────────────────────────────────────────────────────────

/// Counter of outstanding tasks that a thread can block on.
#[derive(Debug, Default)]
pub struct WaitGroup {
    count: Mutex<usize>,
    zero:  Condvar,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, n: usize) {
        *lock(&self.count) += n;
    }

    /// Mark one task finished.
    pub fn done(&self) {
        let mut count = lock(&self.count);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.zero.notify_all();
        }
    }

    pub fn count(&self) -> usize {
        *lock(&self.count)
    }

    /// Block up to `timeout`; returns `true` once the count is zero.  Can be
    /// called again after a timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = lock(&self.count);
        while *count > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            count = self
                .zero
                .wait_timeout(count, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }
}

// ── BarrierOutcome ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierOutcome {
    /// Every drained job ran to completion (successfully or not).
    Completed { executed: usize, failed: usize },
    /// The waiting thread was cancelled with jobs still running.  Callers
    /// should stop advancing ticks.
    Interrupted { outstanding: usize },
}

// ── ActionBarrier ─────────────────────────────────────────────────────────────

/// Multi-producer action queue plus the pool that runs each tick's batch.
pub struct ActionBarrier {
    queue: Mutex<Vec<(String, Job)>>,
    pool:  ThreadPool,
}

impl ActionBarrier {
    /// Build a barrier whose pool has `threads` workers.
    pub fn new(threads: usize) -> SyncResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("aco-action-{i}"))
            .build()?;
        Ok(Self { queue: Mutex::new(Vec::new()), pool })
    }

    /// Queue a job for the next barrier phase.
    pub fn submit<F, E>(&self, label: impl Into<String>, job: F)
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: Display,
    {
        let job: Job = Box::new(move || job().map_err(|e| e.to_string()));
        lock(&self.queue).push((label.into(), job));
    }

    /// Jobs queued and not yet drained.
    pub fn pending(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Drain the queue, run every job on the pool, and wait for all of them.
    ///
    /// Each time `deadline` passes with jobs still running a warning is
    /// logged and the wait starts over; jobs are never abandoned.  Returns
    /// [`BarrierOutcome::Interrupted`] if `cancel` fires while waiting.
    pub fn run_and_wait(&self, deadline: Duration, cancel: &CancelToken) -> BarrierOutcome {
        let jobs = mem::take(&mut *lock(&self.queue));
        let executed = jobs.len();
        if executed == 0 {
            return BarrierOutcome::Completed { executed: 0, failed: 0 };
        }
        debug!(jobs = executed, "dispatching actions");

        let group = Arc::new(WaitGroup::new());
        group.add(executed);
        let failed = Arc::new(AtomicUsize::new(0));

        for (label, job) in jobs {
            let group = Arc::clone(&group);
            let failed = Arc::clone(&failed);
            self.pool.spawn(move || {
                match panic::catch_unwind(AssertUnwindSafe(job)) {
                    Ok(Ok(())) => {}
                    Ok(Err(reason)) => {
                        warn!(action = %label, %reason, "action failed");
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(payload) => {
                        error!(action = %label, panic = %panic_message(payload.as_ref()), "action panicked");
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
                group.done();
            });
        }

        let began = Instant::now();
        let mut next_warning = began + deadline;
        loop {
            if group.wait_timeout(POLL_SLICE) {
                let failed = failed.load(Ordering::Relaxed);
                debug!(executed, failed, elapsed_ms = began.elapsed().as_millis() as u64, "actions complete");
                return BarrierOutcome::Completed { executed, failed };
            }
            if cancel.is_cancelled() {
                let outstanding = group.count();
                warn!(outstanding, "action barrier wait interrupted");
                return BarrierOutcome::Interrupted { outstanding };
            }
            if Instant::now() >= next_warning {
                warn!(
                    outstanding = group.count(),
                    waited_ms = began.elapsed().as_millis() as u64,
                    "actions still running past the deadline; waiting again"
                );
                next_warning += deadline;
            }
        }
    }
}
