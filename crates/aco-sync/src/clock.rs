//! Fixed-period tick driver.

use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::cancel::Latch;
use crate::{CancelToken, SyncError, SyncResult, lock, panic_message};

/// Default bound on how long [`TickClock::stop`] waits for the thread.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// The tick callback.  Returns `true` to stop the clock.
type TickFn = Box<dyn FnMut() -> bool + Send + 'static>;

enum ClockState {
    Idle(TickFn),
    Running { handle: JoinHandle<()>, finished: Arc<Latch> },
    Stopped,
}

/// Calls a tick function on a dedicated thread, aiming for one call per
/// period.
///
/// A tick that overruns its period is followed immediately by the next one
/// (with a warning); a tick that panics is logged and the loop goes on.  The
/// loop ends when the tick returns `true` or the clock is stopped.
pub struct TickClock {
    period_ms:    Arc<AtomicU64>,
    cancel:       CancelToken,
    state:        Mutex<ClockState>,
    join_timeout: Duration,
}

impl TickClock {
    pub fn new<F>(period: Duration, tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        Self {
            period_ms:    Arc::new(AtomicU64::new(period.as_millis() as u64)),
            cancel:       CancelToken::new(),
            state:        Mutex::new(ClockState::Idle(Box::new(tick))),
            join_timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }

    /// Bound on how long [`stop`](Self::stop) waits for the clock thread.
    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Spawn the clock thread.  Calling again while running is a no-op; a
    /// stopped clock cannot be restarted.
    pub fn start(&self) -> SyncResult<()> {
        let mut state = lock(&self.state);
        match mem::replace(&mut *state, ClockState::Stopped) {
            ClockState::Idle(tick) => {
                let finished = Arc::new(Latch::default());
                let period_ms = Arc::clone(&self.period_ms);
                let cancel = self.cancel.clone();
                let done = Arc::clone(&finished);
                let handle = thread::Builder::new()
                    .name("aco-tick-clock".into())
                    .spawn(move || {
                        run_clock(tick, &period_ms, &cancel);
                        done.set();
                    })?;
                info!(period_ms = self.period_ms.load(Ordering::Acquire), "tick clock started");
                *state = ClockState::Running { handle, finished };
                Ok(())
            }
            running @ ClockState::Running { .. } => {
                *state = running;
                Ok(())
            }
            ClockState::Stopped => Err(SyncError::ClockStopped),
        }
    }

    /// Change the period.  Takes effect at the next iteration.
    pub fn set_period(&self, period: Duration) {
        self.period_ms.store(period.as_millis() as u64, Ordering::Release);
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms.load(Ordering::Acquire))
    }

    /// `true` while the clock thread is still looping.
    pub fn is_running(&self) -> bool {
        match &*lock(&self.state) {
            ClockState::Running { finished, .. } => !finished.is_set(),
            _ => false,
        }
    }

    /// Block up to `timeout` for the loop to end on its own.  Returns `true`
    /// if it has ended (or never started).
    pub fn wait_finished(&self, timeout: Duration) -> bool {
        let finished = match &*lock(&self.state) {
            ClockState::Running { finished, .. } => Arc::clone(finished),
            _ => return true,
        };
        finished.wait_timeout(timeout)
    }

    /// Cancel the loop and join the thread, waiting at most the join timeout.
    pub fn stop(&self) {
        self.cancel.cancel();
        let previous = mem::replace(&mut *lock(&self.state), ClockState::Stopped);
        let ClockState::Running { handle, finished } = previous else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            debug!("tick clock stopped from its own thread");
            return;
        }
        if finished.wait_timeout(self.join_timeout) {
            if handle.join().is_err() {
                error!("tick clock thread panicked");
            }
            info!("tick clock stopped");
        } else {
            warn!(
                timeout_ms = self.join_timeout.as_millis() as u64,
                "tick clock thread did not finish in time; detaching"
            );
        }
    }
}

impl Drop for TickClock {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_clock(mut tick: TickFn, period_ms: &AtomicU64, cancel: &CancelToken) {
    let mut iteration = 0u64;
    while !cancel.is_cancelled() {
        iteration += 1;
        let period = Duration::from_millis(period_ms.load(Ordering::Acquire));
        let began = Instant::now();
        debug!(iteration, "tick begins");

        let stop = match panic::catch_unwind(AssertUnwindSafe(|| tick())) {
            Ok(stop) => stop,
            Err(payload) => {
                error!(iteration, panic = %panic_message(payload.as_ref()), "tick panicked; continuing");
                false
            }
        };
        if stop {
            info!(iteration, "tick requested stop");
            break;
        }

        let elapsed = began.elapsed();
        if elapsed < period {
            if cancel.wait_timeout(period - elapsed) {
                break;
            }
        } else if !period.is_zero() {
            warn!(
                iteration,
                elapsed_ms = elapsed.as_millis() as u64,
                period_ms = period.as_millis() as u64,
                "tick overran its period; running behind"
            );
        }
    }
    debug!(iteration, "tick clock loop ended");
}
