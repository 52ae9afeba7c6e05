//! Arrival and response bookkeeping for an open, changing worker population.
//!
//! # Locks
//!
//! | Lock        | Guards                                                     |
//! |-------------|------------------------------------------------------------|
//! | responses   | live population, expected-response count, responder set    |
//! | arrivals    | fresh-arrival flag, in-flight / started flags of the waiter |
//!
//! The expected count is `None` while no response wait is active.  During a
//! wait it starts at the live population and moves with every response,
//! arrival and departure; the waiter wakes when it reaches zero.

use std::collections::HashSet;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use aco_core::WorkerId;
use tracing::{debug, info, warn};

use crate::{CancelToken, POLL_SLICE, SyncError, SyncResult, lock};

/// How often the caller of `wait_for_initial_arrivals` complains while the
/// waiter thread has not started.
const STARTUP_WARN_INTERVAL: Duration = Duration::from_secs(10);

// ── State ─────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ResponseBook {
    population: usize,
    expected:   Option<usize>,
    responded:  HashSet<WorkerId>,
}

#[derive(Default)]
struct ArrivalState {
    fresh:     bool,
    in_flight: bool,
    started:   bool,
}

#[derive(Default)]
struct ArrivalGate {
    state:   Mutex<ArrivalState>,
    changed: Condvar,
    waiting: AtomicBool,
}

// ── ResponseReport ────────────────────────────────────────────────────────────

/// Outcome of one [`WorkerCoordinator::wait_for_responses`].
#[derive(Debug, Clone)]
pub struct ResponseReport {
    /// Live population when the wait began.
    pub expected:    usize,
    /// Distinct workers that responded during the wait.
    pub responders:  HashSet<WorkerId>,
    /// Responses still missing when the wait ended (0 on success).
    pub outstanding: usize,
    pub elapsed:     Duration,
    pub timed_out:   bool,
    pub interrupted: bool,
}

impl ResponseReport {
    pub fn responded(&self) -> usize {
        self.responders.len()
    }

    pub fn is_complete(&self) -> bool {
        self.outstanding == 0
    }
}

// ── WorkerCoordinator ─────────────────────────────────────────────────────────

/// Tracks who is alive and who has answered this tick.
///
/// All methods take `&self`; share the coordinator behind an `Arc`.
pub struct WorkerCoordinator {
    responses:    Mutex<ResponseBook>,
    responses_cv: Condvar,
    arrivals:     Arc<ArrivalGate>,
    cancel:       CancelToken,
}

impl Default for WorkerCoordinator {
    fn default() -> Self {
        Self::new(CancelToken::new())
    }
}

impl WorkerCoordinator {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            responses:    Mutex::new(ResponseBook::default()),
            responses_cv: Condvar::new(),
            arrivals:     Arc::new(ArrivalGate::default()),
            cancel,
        }
    }

    // ── Initial arrivals ──────────────────────────────────────────────────

    /// Wait on a background thread until `idle_timeout` passes with no new
    /// arrival, then run `on_settled` on that thread.
    ///
    /// Every [`arrive`](Self::arrive) during the wait pushes the deadline back
    /// by a full `idle_timeout`.  Returns once the waiter thread is running.
    /// Only one arrival wait may be in flight; a second call fails with
    /// [`SyncError::ArrivalWaitInFlight`].  If the coordinator's cancel token
    /// fires first, the waiter exits without calling `on_settled`.
    pub fn wait_for_initial_arrivals<F>(&self, on_settled: F, idle_timeout: Duration) -> SyncResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = lock(&self.arrivals.state);
            if state.in_flight {
                return Err(SyncError::ArrivalWaitInFlight);
            }
            *state = ArrivalState { fresh: false, in_flight: true, started: false };
        }
        self.arrivals.waiting.store(true, Ordering::Release);
        info!(idle_ms = idle_timeout.as_millis() as u64, "waiting for initial worker arrivals");

        let gate = Arc::clone(&self.arrivals);
        let cancel = self.cancel.clone();
        let spawned = thread::Builder::new()
            .name("aco-arrival-wait".into())
            .spawn(move || run_arrival_wait(gate, cancel, idle_timeout, on_settled));
        if let Err(e) = spawned {
            self.arrivals.waiting.store(false, Ordering::Release);
            lock(&self.arrivals.state).in_flight = false;
            return Err(SyncError::Spawn(e));
        }

        let mut state = lock(&self.arrivals.state);
        while !state.started {
            let (guard, result) = self
                .arrivals
                .changed
                .wait_timeout(state, STARTUP_WARN_INTERVAL)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
            if result.timed_out() && !state.started {
                warn!("arrival waiter thread has not started yet");
            }
        }
        Ok(())
    }

    // ── Per-tick responses ────────────────────────────────────────────────

    /// Block until every live worker has responded, `timeout` passes
    /// (`None` waits indefinitely) or the wait is cancelled.
    ///
    /// `on_ready` runs inside the critical section that establishes the
    /// expected count, so a worker that reacts to it instantly cannot respond
    /// before the wait is armed.  It must not call back into this
    /// coordinator on the same thread.  With no live workers the wait
    /// completes at once and `on_ready` is not called.  If `on_ready`
    /// panics the wait is disarmed before the panic propagates.
    pub fn wait_for_responses<F>(&self, on_ready: F, timeout: Option<Duration>) -> SyncResult<ResponseReport>
    where
        F: FnOnce(),
    {
        let mut book = lock(&self.responses);
        if book.expected.is_some() {
            return Err(SyncError::ResponseWaitActive);
        }

        let began = Instant::now();
        let expected = book.population;
        book.expected = Some(expected);
        let deadline = timeout.map(|t| began + t);
        let mut timed_out = false;
        let mut interrupted = false;

        if expected == 0 {
            debug!("no live workers; response wait completes immediately");
        } else {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(on_ready)) {
                book.expected = None;
                book.responded.clear();
                drop(book);
                warn!("notice publication panicked; response wait disarmed");
                panic::resume_unwind(payload);
            }
            while book.expected.is_some_and(|n| n > 0) {
                if self.cancel.is_cancelled() {
                    interrupted = true;
                    warn!("response wait interrupted");
                    break;
                }
                let slice = match deadline {
                    Some(deadline) => {
                        let now = Instant::now();
                        if now >= deadline {
                            timed_out = true;
                            break;
                        }
                        (deadline - now).min(POLL_SLICE)
                    }
                    None => POLL_SLICE,
                };
                book = self
                    .responses_cv
                    .wait_timeout(book, slice)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
        }

        let outstanding = book.expected.take().unwrap_or(0);
        let responders = mem::take(&mut book.responded);
        drop(book);

        let report = ResponseReport {
            expected,
            responders,
            outstanding,
            elapsed: began.elapsed(),
            timed_out,
            interrupted,
        };
        if timed_out {
            warn!(
                responded = report.responded(),
                outstanding,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "response wait timed out"
            );
        } else {
            info!(
                responded = report.responded(),
                elapsed_ms = report.elapsed.as_millis() as u64,
                "response wait finished"
            );
        }
        Ok(report)
    }

    // ── Worker events ─────────────────────────────────────────────────────

    /// A worker joined.
    pub fn arrive(&self, worker: &WorkerId) {
        if self.arrivals.waiting.load(Ordering::Acquire) {
            let mut state = lock(&self.arrivals.state);
            state.fresh = true;
            self.arrivals.changed.notify_all();
        }

        let mut book = lock(&self.responses);
        book.population += 1;
        if let Some(n) = book.expected.as_mut() {
            *n += 1;
        }
        debug!(worker = %worker, population = book.population, "worker arrived");
    }

    /// A worker left.
    pub fn depart(&self, worker: &WorkerId) {
        let mut book = lock(&self.responses);
        if book.population == 0 {
            warn!(worker = %worker, "departure with no live workers");
        } else {
            book.population -= 1;
        }
        if let Some(n) = book.expected.as_mut() {
            if *n > 0 {
                *n -= 1;
                if *n == 0 {
                    self.responses_cv.notify_all();
                }
            }
        }
        debug!(worker = %worker, population = book.population, "worker departed");
    }

    /// A worker answered the current tick.
    ///
    /// Returns `true` if the response counted.  Responses outside an active
    /// wait are logged and discarded; repeats within one wait are ignored.
    pub fn respond(&self, worker: &WorkerId) -> bool {
        let mut book = lock(&self.responses);
        let remaining = match book.expected {
            Some(n) if n > 0 => n,
            _ => {
                warn!(worker = %worker, "response outside an active wait; discarded");
                return false;
            }
        };
        if !book.responded.insert(worker.clone()) {
            debug!(worker = %worker, "duplicate response ignored");
            return false;
        }
        book.expected = Some(remaining - 1);
        if remaining == 1 {
            self.responses_cv.notify_all();
        }
        true
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn population(&self) -> usize {
        lock(&self.responses).population
    }

    pub fn is_waiting_for_responses(&self) -> bool {
        lock(&self.responses).expected.is_some()
    }

    pub fn is_waiting_for_arrivals(&self) -> bool {
        self.arrivals.waiting.load(Ordering::Acquire)
    }
}

// ── Arrival waiter thread ─────────────────────────────────────────────────────

fn run_arrival_wait<F: FnOnce()>(gate: Arc<ArrivalGate>, cancel: CancelToken, idle: Duration, on_settled: F) {
    let began = Instant::now();
    let mut state = lock(&gate.state);
    state.started = true;
    gate.changed.notify_all();

    let settled = 'outer: loop {
        let deadline = Instant::now() + idle;
        while !state.fresh {
            if cancel.is_cancelled() {
                break 'outer false;
            }
            let now = Instant::now();
            if now >= deadline {
                break 'outer true;
            }
            state = gate
                .changed
                .wait_timeout(state, (deadline - now).min(POLL_SLICE))
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        state.fresh = false;
        debug!("arrival observed; idle deadline reset");
    };

    state.in_flight = false;
    gate.waiting.store(false, Ordering::Release);
    drop(state);

    if settled {
        info!(elapsed_ms = began.elapsed().as_millis() as u64, "arrivals settled");
        on_settled();
    } else {
        info!("initial-arrival wait cancelled");
    }
}
