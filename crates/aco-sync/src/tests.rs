//! Unit tests for aco-sync.

#[cfg(test)]
mod coordinator_tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    use aco_core::WorkerId;

    use crate::{CancelToken, SyncError, WorkerCoordinator};

    fn ants(n: usize) -> Vec<WorkerId> {
        (0..n).map(|i| WorkerId::new(format!("ant-{i}"))).collect()
    }

    fn populated(n: usize) -> (Arc<WorkerCoordinator>, Vec<WorkerId>) {
        let coordinator = Arc::new(WorkerCoordinator::default());
        let ids = ants(n);
        for id in &ids {
            coordinator.arrive(id);
        }
        (coordinator, ids)
    }

    /// `on_ready` callback that spawns one thread per id, each responding.
    fn respond_all(coordinator: &Arc<WorkerCoordinator>, ids: &[WorkerId]) -> impl FnOnce() {
        let coordinator = Arc::clone(coordinator);
        let ids = ids.to_vec();
        move || {
            for id in ids {
                let coordinator = Arc::clone(&coordinator);
                thread::spawn(move || {
                    coordinator.respond(&id);
                });
            }
        }
    }

    #[test]
    fn every_worker_responds() {
        let (coordinator, ids) = populated(5);
        let report = coordinator
            .wait_for_responses(respond_all(&coordinator, &ids), Some(Duration::from_secs(5)))
            .unwrap();
        assert_eq!(report.expected, 5);
        assert_eq!(report.responded(), 5);
        assert!(report.is_complete());
        assert!(!report.timed_out);
        assert!(!coordinator.is_waiting_for_responses());
    }

    #[test]
    fn duplicate_responses_count_once() {
        let (coordinator, ids) = populated(2);
        let c = Arc::clone(&coordinator);
        let first = ids[0].clone();
        let second = ids[1].clone();
        let report = coordinator
            .wait_for_responses(
                move || {
                    thread::spawn(move || {
                        assert!(c.respond(&first));
                        assert!(!c.respond(&first));
                        assert!(c.respond(&second));
                    });
                },
                Some(Duration::from_secs(5)),
            )
            .unwrap();
        assert_eq!(report.responded(), 2);
        assert!(report.is_complete());
    }

    #[test]
    fn panicking_notice_disarms_the_wait() {
        let (coordinator, _ids) = populated(1);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            coordinator.wait_for_responses(|| panic!("sink failed"), Some(Duration::from_secs(5)))
        }));
        assert!(outcome.is_err());
        assert!(!coordinator.is_waiting_for_responses());

        let report = coordinator
            .wait_for_responses(|| {}, Some(Duration::from_millis(50)))
            .unwrap();
        assert!(report.timed_out);
        assert_eq!(report.outstanding, 1);
    }

    #[test]
    fn response_outside_wait_is_discarded() {
        let (coordinator, ids) = populated(1);
        assert!(!coordinator.respond(&ids[0]));

        let report = coordinator
            .wait_for_responses(|| {}, Some(Duration::from_millis(100)))
            .unwrap();
        assert!(report.timed_out, "the early response must not carry over");
        assert_eq!(report.outstanding, 1);
    }

    #[test]
    fn empty_population_completes_without_notifying() {
        let coordinator = WorkerCoordinator::default();
        let mut notified = false;
        let report = coordinator.wait_for_responses(|| notified = true, None).unwrap();
        assert!(!notified);
        assert_eq!(report.expected, 0);
        assert!(report.is_complete());
    }

    #[test]
    fn timeout_reports_missing_responses() {
        let (coordinator, ids) = populated(3);
        let began = Instant::now();
        let report = coordinator
            .wait_for_responses(respond_all(&coordinator, &ids[..1]), Some(Duration::from_millis(150)))
            .unwrap();
        assert!(report.timed_out);
        assert_eq!(report.responded(), 1);
        assert_eq!(report.outstanding, 2);
        assert!(began.elapsed() >= Duration::from_millis(150));
    }

    #[test]
    fn concurrent_wait_is_rejected() {
        let (coordinator, _ids) = populated(1);
        let c = Arc::clone(&coordinator);
        let waiter = thread::spawn(move || {
            c.wait_for_responses(|| {}, Some(Duration::from_millis(500))).unwrap()
        });
        while !coordinator.is_waiting_for_responses() {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(matches!(
            coordinator.wait_for_responses(|| {}, None),
            Err(SyncError::ResponseWaitActive)
        ));
        assert!(waiter.join().unwrap().timed_out);
    }

    #[test]
    fn departure_during_wait_releases_it() {
        let (coordinator, ids) = populated(2);
        let c = Arc::clone(&coordinator);
        let (stay, leave) = (ids[0].clone(), ids[1].clone());
        let report = coordinator
            .wait_for_responses(
                move || {
                    thread::spawn(move || {
                        c.respond(&stay);
                        c.depart(&leave);
                    });
                },
                Some(Duration::from_secs(5)),
            )
            .unwrap();
        assert!(report.is_complete());
        assert_eq!(report.responded(), 1);
        assert_eq!(coordinator.population(), 1);
    }

    #[test]
    fn arrival_during_wait_extends_it() {
        let (coordinator, ids) = populated(1);
        let c = Arc::clone(&coordinator);
        let newcomer = WorkerId::new("late");
        let first = ids[0].clone();
        let report = coordinator
            .wait_for_responses(
                move || {
                    thread::spawn(move || {
                        c.respond(&first);
                        c.arrive(&newcomer);
                        c.respond(&newcomer);
                    });
                },
                Some(Duration::from_secs(5)),
            )
            .unwrap();
        assert!(report.is_complete());
        assert_eq!(report.responded(), 2);
    }

    #[test]
    fn cancellation_interrupts_wait() {
        let cancel = CancelToken::new();
        let coordinator = WorkerCoordinator::new(cancel.clone());
        coordinator.arrive(&WorkerId::new("mute"));
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            cancel.cancel();
        });
        let report = coordinator.wait_for_responses(|| {}, None).unwrap();
        assert!(report.interrupted);
        assert_eq!(report.outstanding, 1);
        canceller.join().unwrap();
    }

    #[test]
    fn arrivals_push_back_the_idle_deadline() {
        let coordinator = WorkerCoordinator::default();
        let idle = Duration::from_millis(200);
        let (tx, rx) = mpsc::channel();
        coordinator
            .wait_for_initial_arrivals(move || tx.send(Instant::now()).unwrap(), idle)
            .unwrap();
        assert!(coordinator.is_waiting_for_arrivals());

        let mut last_arrival = Instant::now();
        for id in ants(4) {
            thread::sleep(Duration::from_millis(100));
            coordinator.arrive(&id);
            last_arrival = Instant::now();
        }

        let settled_at = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(settled_at >= last_arrival + idle - Duration::from_millis(5));
        assert_eq!(coordinator.population(), 4);
    }

    #[test]
    fn single_arrival_wait_in_flight() {
        let coordinator = WorkerCoordinator::default();
        coordinator.wait_for_initial_arrivals(|| {}, Duration::from_millis(300)).unwrap();
        assert!(matches!(
            coordinator.wait_for_initial_arrivals(|| {}, Duration::from_millis(300)),
            Err(SyncError::ArrivalWaitInFlight)
        ));
    }

    #[test]
    fn cancelled_arrival_wait_never_settles() {
        let cancel = CancelToken::new();
        let coordinator = WorkerCoordinator::new(cancel.clone());
        let (tx, rx) = mpsc::channel::<()>();
        coordinator
            .wait_for_initial_arrivals(move || tx.send(()).unwrap(), Duration::from_millis(300))
            .unwrap();
        cancel.cancel();
        assert!(rx.recv_timeout(Duration::from_secs(1)).is_err());
    }
}

#[cfg(test)]
mod clock_tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::{Duration, Instant};

    use crate::{SyncError, TickClock};

    fn counting_clock(period: Duration, stop_after: usize) -> (TickClock, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let clock = TickClock::new(period, move || c.fetch_add(1, Ordering::SeqCst) + 1 >= stop_after);
        (clock, count)
    }

    #[test]
    fn runs_until_tick_requests_stop() {
        let (clock, count) = counting_clock(Duration::ZERO, 5);
        clock.start().unwrap();
        assert!(clock.wait_finished(Duration::from_secs(5)));
        assert_eq!(count.load(Ordering::SeqCst), 5);
        assert!(!clock.is_running());
    }

    #[test]
    fn period_spaces_ticks() {
        let (clock, _count) = counting_clock(Duration::from_millis(50), 4);
        let began = Instant::now();
        clock.start().unwrap();
        assert!(clock.wait_finished(Duration::from_secs(5)));
        // Three full sleeps separate four ticks.
        assert!(began.elapsed() >= Duration::from_millis(150));
    }

    #[test]
    fn overrun_continues_immediately() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let clock = TickClock::new(Duration::from_millis(10), move || {
            thread::sleep(Duration::from_millis(30));
            c.fetch_add(1, Ordering::SeqCst) + 1 >= 3
        });
        clock.start().unwrap();
        assert!(clock.wait_finished(Duration::from_secs(5)));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn panicking_tick_does_not_stop_the_clock() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let clock = TickClock::new(Duration::ZERO, move || {
            let n = c.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 1 {
                panic!("first tick fails");
            }
            n >= 3
        });
        clock.start().unwrap();
        assert!(clock.wait_finished(Duration::from_secs(5)));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn stop_interrupts_a_long_sleep() {
        let (clock, count) = counting_clock(Duration::from_secs(30), usize::MAX);
        clock.start().unwrap();
        clock.start().unwrap();
        while count.load(Ordering::SeqCst) == 0 {
            thread::sleep(Duration::from_millis(5));
        }
        let began = Instant::now();
        clock.stop();
        assert!(began.elapsed() < Duration::from_secs(5));
        assert!(!clock.is_running());
        assert!(matches!(clock.start(), Err(SyncError::ClockStopped)));
    }

    #[test]
    fn stop_detaches_a_tick_that_outlives_the_join_timeout() {
        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let clock = TickClock::new(Duration::ZERO, move || {
            let _ = started_tx.send(());
            thread::sleep(Duration::from_millis(500));
            false
        })
        .with_join_timeout(Duration::from_millis(50));
        clock.start().unwrap();
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let began = Instant::now();
        clock.stop();
        assert!(began.elapsed() < Duration::from_millis(400), "stop must not wait for the tick");
        assert!(!clock.is_running());
        assert!(matches!(clock.start(), Err(SyncError::ClockStopped)));
    }

    #[test]
    fn period_change_applies_next_iteration() {
        let (clock, count) = counting_clock(Duration::from_secs(30), 3);
        clock.start().unwrap();
        while count.load(Ordering::SeqCst) == 0 {
            thread::sleep(Duration::from_millis(5));
        }
        // The current 30 s sleep still runs; the change shows up afterwards.
        clock.set_period(Duration::ZERO);
        assert_eq!(clock.period(), Duration::ZERO);
        assert!(!clock.wait_finished(Duration::from_millis(200)));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}

#[cfg(test)]
mod barrier_tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use crate::{ActionBarrier, BarrierOutcome, CancelToken, WaitGroup};

    #[test]
    fn runs_every_queued_action() {
        let barrier = ActionBarrier::new(4).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        for i in 0..100 {
            let hits = Arc::clone(&hits);
            barrier.submit(format!("job-{i}"), move || {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok::<(), String>(())
            });
        }
        assert_eq!(barrier.pending(), 100);

        let outcome = barrier.run_and_wait(Duration::from_secs(5), &CancelToken::new());
        assert_eq!(outcome, BarrierOutcome::Completed { executed: 100, failed: 0 });
        assert_eq!(hits.load(Ordering::SeqCst), 100);
        assert_eq!(barrier.pending(), 0);
    }

    #[test]
    fn failures_are_isolated() {
        let barrier = ActionBarrier::new(2).unwrap();
        let ran = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&ran);
        barrier.submit("ok", move || {
            r.fetch_add(1, Ordering::SeqCst);
            Ok::<(), String>(())
        });
        barrier.submit("err", || Err("no road"));
        barrier.submit("panic", || -> Result<(), String> { panic!("boom") });

        let outcome = barrier.run_and_wait(Duration::from_secs(5), &CancelToken::new());
        assert_eq!(outcome, BarrierOutcome::Completed { executed: 3, failed: 2 });
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn waits_past_the_deadline() {
        let barrier = ActionBarrier::new(1).unwrap();
        barrier.submit("slow", || {
            thread::sleep(Duration::from_millis(200));
            Ok::<(), String>(())
        });
        let outcome = barrier.run_and_wait(Duration::from_millis(20), &CancelToken::new());
        assert_eq!(outcome, BarrierOutcome::Completed { executed: 1, failed: 0 });
    }

    #[test]
    fn cancellation_interrupts_the_wait() {
        let barrier = ActionBarrier::new(1).unwrap();
        barrier.submit("stuck", || {
            thread::sleep(Duration::from_secs(1));
            Ok::<(), String>(())
        });
        let cancel = CancelToken::new();
        let c = cancel.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            c.cancel();
        });
        let outcome = barrier.run_and_wait(Duration::from_secs(30), &cancel);
        assert_eq!(outcome, BarrierOutcome::Interrupted { outstanding: 1 });
        canceller.join().unwrap();
    }

    #[test]
    fn empty_queue_completes_at_once() {
        let barrier = ActionBarrier::new(1).unwrap();
        let outcome = barrier.run_and_wait(Duration::from_secs(1), &CancelToken::new());
        assert_eq!(outcome, BarrierOutcome::Completed { executed: 0, failed: 0 });
    }

    #[test]
    fn wait_group_retries_after_timeout() {
        let group = Arc::new(WaitGroup::new());
        group.add(1);
        assert!(!group.wait_timeout(Duration::from_millis(20)));
        let g = Arc::clone(&group);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            g.done();
        });
        assert!(group.wait_timeout(Duration::from_secs(5)));
        assert_eq!(group.count(), 0);
    }
}
