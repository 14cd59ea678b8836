//! # ThreadLifecycleManager: supervises one background worker.
//!
//! The manager owns the lifecycle state, per-state entry counters, the
//! captured worker error, the executor and the blocking wait protocol.
//! Transition requests are posted to a dispatcher thread; only that thread
//! applies transitions, through [`State::on_event`] and `set_state`.
//!
//! ## Architecture
//! ```text
//! caller ── start()/stop() ──► Poster ──► dispatcher thread
//!                                             │ handle_event(ev)
//!                                             │   state.on_event(ev)   (transition table)
//!                                             │   effect: launch / cancel worker
//!                                             ▼
//!                                        set_state(next, error)
//!                                   ┌─ lock ───────────────────────────┐
//!                                   │ state = next; counters[next] += 1 │
//!                                   │ error = error; notify_all()       │
//!                                   └──────────────────────────────────┘
//!                                        outside the lock:
//!                                        Started → RunnableStarted
//!                                        Stopped → RunnableStopped(error)
//!
//! caller ── start_and_wait(t) ──► lock, snapshot counters, post, wait on condvar
//!                                 until target state or counter advance or t elapsed
//! ```
//!
//! ## Rules
//! - State, counters, captured error, runnable and executor live under one lock.
//! - Nothing but a non-blocking channel send happens while a caller holds it.
//! - Public notifications are broadcast outside the lock; the runnable's name
//!   they carry is cached at attach time, so no runnable code runs under it.
//! - Worker events from a launch other than the current one are dropped.
//! - The captured error is last-write-wins: every transition overwrites it, so a
//!   failure from a cycle nobody waited on is not visible afterwards.
//! - Timeouts and teardown during a wait are not errors.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::builder::ManagerBuilder;
use super::config::ManagerConfig;
use super::dispatcher::{self, Dispatch, Poster};
use super::executor::Executor;
use super::state::{Counters, Effect, LifecycleEvent, State};
use super::worker::Worker;
use crate::error::{LifecycleError, SharedError};
use crate::events::{Bus, Event, EventKind};
use crate::runnables::RunnableRef;
use crate::subscribers::SubscriberSet;

/// Everything guarded by the manager lock.
struct Monitor {
    state: State,
    counters: Counters,
    error: Option<SharedError>,
    runnable: Option<RunnableRef>,
    runnable_name: Option<Arc<str>>,
    executor: Option<Executor>,
    /// Id of the most recent launch; worker events carrying another id are stale.
    launch: u64,
    /// Cancellation token of the running worker, if any.
    active: Option<CancellationToken>,
    closed: bool,
}

/// State shared between the manager handle and the dispatcher thread.
struct Shared {
    monitor: Mutex<Monitor>,
    cond: Condvar,
    poster: Poster,
    bus: Bus,
    subs: SubscriberSet,
}

impl Shared {
    /// Routes a delivered event to the current state's handler and applies the result.
    ///
    /// Runs on the dispatcher thread only, so the state read here cannot change
    /// before `set_state` is called below, except by teardown, which
    /// `set_state` checks for.
    fn handle_event(&self, ev: LifecycleEvent) {
        let (current, launch, closed) = {
            let m = self.monitor.lock();
            (m.state, m.launch, m.closed)
        };
        if closed {
            trace!(event = ev.as_label(), "manager shut down; event dropped");
            return;
        }
        if ev.launch().is_some_and(|l| l != launch) {
            trace!(
                event = ev.as_label(),
                stale = ?ev.launch(),
                current = launch,
                "event from an ended launch ignored"
            );
            return;
        }
        let Some(transition) = current.on_event(&ev) else {
            trace!(event = ev.as_label(), state = %current, "event ignored");
            return;
        };

        match transition.effect {
            Effect::LaunchWorker => {
                self.set_state(transition.next, None);
                if let Err(e) = self.start_worker() {
                    warn!(error = %e, "worker launch failed");
                    self.set_state(State::Stopped, Some(Arc::new(e)));
                }
            }
            Effect::CancelWorker => {
                self.set_state(transition.next, None);
                self.cancel_worker();
            }
            Effect::None => {
                let error = match ev {
                    LifecycleEvent::WorkerTerminated { error, .. } => error,
                    _ => None,
                };
                self.set_state(transition.next, error);
            }
        }
    }

    /// Enters `next`, records it, stores `error` and wakes every waiter.
    ///
    /// Does nothing once the manager is shut down.
    fn set_state(&self, next: State, error: Option<SharedError>) {
        let (prev, error, runnable) = {
            let mut m = self.monitor.lock();
            if m.closed {
                trace!(to = %next, "manager shut down; transition dropped");
                return;
            }
            let prev = m.state;
            m.state = next;
            m.counters.record(next);
            m.error = error;
            if next == State::Stopped {
                m.active = None;
            }
            self.cond.notify_all();
            (prev, m.error.clone(), m.runnable_name.clone())
        };
        debug!(from = %prev, to = %next, failed = error.is_some(), "state changed");

        let kind = match next {
            State::Started => EventKind::RunnableStarted,
            State::Stopped => EventKind::RunnableStopped,
            State::Starting | State::Stopping => return,
        };
        let mut ev = Event::new(kind);
        if let Some(name) = runnable {
            ev = ev.with_runnable(name);
        }
        if let (EventKind::RunnableStopped, Some(err)) = (kind, error) {
            ev = ev.with_error(err);
        }
        self.subs.emit(&ev);
        self.bus.publish(ev);
    }

    /// Launches a worker for the attached runnable on the executor.
    fn start_worker(&self) -> Result<(), LifecycleError> {
        let (handle, runnable, token, launch) = {
            let mut m = self.monitor.lock();
            let runnable = m
                .runnable
                .clone()
                .ok_or_else(|| LifecycleError::Configuration {
                    reason: "no managed runnable attached".to_string(),
                })?;
            let handle = match &m.executor {
                Some(executor) => executor.handle(),
                None => {
                    return Err(LifecycleError::IllegalState {
                        state: m.state,
                        reason: "executor already shut down".to_string(),
                    });
                }
            };
            let token = CancellationToken::new();
            m.active = Some(token.clone());
            m.launch += 1;
            (handle, runnable, token, m.launch)
        };

        debug!(runnable = runnable.name(), launch, "starting worker");
        let worker = Worker::new(runnable, self.poster.clone(), token, launch);
        handle.spawn(worker.run());
        Ok(())
    }

    fn cancel_worker(&self) {
        if let Some(token) = self.monitor.lock().active.clone() {
            token.cancel();
        }
    }
}

/// Supervises a single background worker through
/// `Stopped → Starting → Started → Stopping → Stopped`.
///
/// All methods take `&self`; share the manager across threads with `Arc`.
/// Dropping the manager runs [`shutdown`](Self::shutdown).
///
/// The blocking methods park the calling OS thread; call them from plain
/// threads or `spawn_blocking`, not from async tasks.
pub struct ThreadLifecycleManager {
    shared: Arc<Shared>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadLifecycleManager {
    /// Returns a builder with default configuration.
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new(ManagerConfig::default())
    }

    /// Creates a manager for `runnable` with an owned executor and default configuration.
    pub fn new(runnable: RunnableRef) -> Result<Self, LifecycleError> {
        Self::builder().with_runnable(runnable).build()
    }

    pub(crate) fn new_internal(
        cfg: &ManagerConfig,
        executor: Executor,
        runnable: Option<RunnableRef>,
        subs: SubscriberSet,
    ) -> Result<Self, LifecycleError> {
        let (poster, rx) = dispatcher::channel();
        let runnable_name: Option<Arc<str>> = runnable.as_ref().map(|r| Arc::from(r.name()));
        let shared = Arc::new(Shared {
            monitor: Mutex::new(Monitor {
                state: State::Stopped,
                counters: Counters::default(),
                error: None,
                runnable,
                runnable_name,
                executor: Some(executor),
                launch: 0,
                active: None,
                closed: false,
            }),
            cond: Condvar::new(),
            poster,
            bus: Bus::new(cfg.bus_capacity_clamped()),
            subs,
        });

        let join = Self::spawn_dispatcher(&cfg.dispatcher_thread_name, &shared, rx)?;
        debug!(
            owned_executor = shared.monitor.lock().executor.as_ref().is_some_and(Executor::is_owned),
            "created"
        );
        Ok(Self {
            shared,
            dispatcher: Mutex::new(Some(join)),
        })
    }

    fn spawn_dispatcher(
        name: &str,
        shared: &Arc<Shared>,
        rx: mpsc::UnboundedReceiver<Dispatch>,
    ) -> Result<JoinHandle<()>, LifecycleError> {
        let target = Arc::clone(shared);
        dispatcher::spawn(name, rx, move |ev| target.handle_event(ev)).inspect_err(|_| {
            if let Some(executor) = shared.monitor.lock().executor.take() {
                executor.shutdown();
            }
        })
    }

    /// Attaches the managed runnable.
    ///
    /// Only allowed while `Stopped` and when no runnable is attached yet.
    pub fn set_managed_runnable(&self, runnable: RunnableRef) -> Result<(), LifecycleError> {
        let name: Arc<str> = Arc::from(runnable.name());
        let mut m = self.shared.monitor.lock();
        if m.closed {
            return Err(closed_error(m.state));
        }
        if m.state != State::Stopped {
            return Err(LifecycleError::Configuration {
                reason: format!("runnable can only be attached while stopped (state: {})", m.state),
            });
        }
        if m.runnable.is_some() {
            return Err(LifecycleError::Configuration {
                reason: "managed runnable already attached".to_string(),
            });
        }
        m.runnable = Some(runnable);
        m.runnable_name = Some(name);
        Ok(())
    }

    /// The attached runnable, if any.
    pub fn managed_runnable(&self) -> Option<RunnableRef> {
        self.shared.monitor.lock().runnable.clone()
    }

    /// Current lifecycle state.
    ///
    /// `Stopped` after [`shutdown`](Self::shutdown), whatever the worker was doing.
    pub fn state(&self) -> State {
        self.shared.monitor.lock().state
    }

    /// Snapshot of the per-state entry counters.
    pub fn counters(&self) -> Counters {
        self.shared.monitor.lock().counters
    }

    /// Error captured by the most recent transition, if any.
    pub fn worker_error(&self) -> Option<SharedError> {
        self.shared.monitor.lock().error.clone()
    }

    /// True once [`shutdown`](Self::shutdown) has run.
    pub fn is_shut_down(&self) -> bool {
        self.shared.monitor.lock().closed
    }

    /// Receives `RunnableStarted` / `RunnableStopped` notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }

    /// Requests a start and returns immediately.
    ///
    /// Ignored unless the manager is `Stopped` when the request is processed.
    pub fn start(&self) {
        self.post(LifecycleEvent::StartRequested);
    }

    /// Requests a stop and returns immediately.
    ///
    /// Cancels the worker's token; the transition to `Stopped` happens when
    /// the worker actually exits.
    pub fn stop(&self) {
        self.post(LifecycleEvent::StopRequested);
    }

    fn post(&self, ev: LifecycleEvent) {
        if self.shared.monitor.lock().closed {
            warn!(event = ev.as_label(), "manager shut down; request ignored");
            return;
        }
        self.shared.poster.post(ev);
    }

    /// Starts the worker and blocks until it reports `Started`.
    ///
    /// A start is only requested when the manager is `Stopped`; otherwise the
    /// call waits for the transition already in flight. Returns early, without
    /// error, when `timeout` elapses (`Duration::ZERO` waits forever) or when
    /// the manager is shut down meanwhile. If a full stop cycle is observed
    /// instead, the captured worker error (if any) is returned.
    pub fn start_and_wait(&self, timeout: Duration) -> Result<(), LifecycleError> {
        let mut m = self.shared.monitor.lock();
        if m.closed {
            return Err(closed_error(m.state));
        }

        if m.state != State::Started {
            let stopping = m.counters.stopping;
            let stopped = m.counters.stopped;
            if m.state == State::Stopped {
                self.shared.poster.post(LifecycleEvent::StartRequested);
            }

            let mut budget = WaitBudget::new(timeout);
            while m.counters.stopping == stopping
                && m.counters.stopped == stopped
                && m.state != State::Started
                && !m.closed
            {
                if !budget.wait(&self.shared.cond, &mut m) {
                    break;
                }
            }
            if m.closed {
                return Ok(());
            }
        }
        raise_captured(&m)
    }

    /// Requests a stop and blocks until the worker reports `Stopped`.
    ///
    /// Returns the captured worker error, if the observed stop carried one.
    /// Timeout and shutdown behave as in [`start_and_wait`](Self::start_and_wait).
    pub fn stop_and_wait(&self, timeout: Duration) -> Result<(), LifecycleError> {
        let mut m = self.shared.monitor.lock();
        if m.closed {
            return Err(closed_error(m.state));
        }

        let stopped = m.counters.stopped;
        self.shared.poster.post(LifecycleEvent::StopRequested);

        let mut budget = WaitBudget::new(timeout);
        while m.counters.stopped == stopped && m.state != State::Stopped && !m.closed {
            if !budget.wait(&self.shared.cond, &mut m) {
                break;
            }
        }
        if m.closed {
            return Ok(());
        }
        raise_captured(&m)
    }

    /// Tears the manager down.
    ///
    /// Cancels a running worker, wakes every waiter, stops the dispatcher and
    /// releases the executor: an owned runtime is shut down without waiting
    /// for in-flight work, a borrowed one is left running. Idempotent.
    ///
    /// The state is forced to `Stopped`. This entry is not counted and no
    /// `RunnableStopped` notification is sent; the worker's own termination
    /// report is dropped.
    pub fn shutdown(&self) {
        let executor = {
            let mut m = self.shared.monitor.lock();
            if m.closed {
                return;
            }
            m.closed = true;
            if let Some(token) = m.active.take() {
                token.cancel();
            }
            m.state = State::Stopped;
            m.runnable = None;
            m.runnable_name = None;
            self.shared.cond.notify_all();
            m.executor.take()
        };

        self.shared.poster.close();
        if let Some(join) = self.dispatcher.lock().take() {
            if join.thread().id() == thread::current().id() {
                warn!("shutdown called from the dispatcher thread; not joining");
            } else if join.join().is_err() {
                warn!("dispatcher thread panicked");
            }
        }

        if let Some(executor) = executor {
            let owned = executor.is_owned();
            executor.shutdown();
            debug!(owned_executor = owned, "executor released");
        }
    }
}

impl Drop for ThreadLifecycleManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn closed_error(state: State) -> LifecycleError {
    LifecycleError::IllegalState {
        state,
        reason: "manager has been shut down".to_string(),
    }
}

fn raise_captured(m: &Monitor) -> Result<(), LifecycleError> {
    match &m.error {
        Some(err) => Err(LifecycleError::from_worker(err)),
        None => Ok(()),
    }
}

/// Remaining wait time across spurious or early wakeups.
struct WaitBudget {
    /// `None` waits forever.
    remaining: Option<Duration>,
}

impl WaitBudget {
    fn new(timeout: Duration) -> Self {
        Self {
            remaining: (!timeout.is_zero()).then_some(timeout),
        }
    }

    /// Waits once on `cond`; returns `false` when the budget is used up.
    fn wait<T>(&mut self, cond: &Condvar, guard: &mut MutexGuard<'_, T>) -> bool {
        match self.remaining {
            None => {
                cond.wait(guard);
                true
            }
            Some(remaining) => {
                let before = Instant::now();
                cond.wait_for(guard, remaining);
                let left = remaining.saturating_sub(before.elapsed());
                self.remaining = Some(left);
                !left.is_zero()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::{RunnableError, WorkerPanic};
    use crate::runnables::{ManagedRunnable, RunnableFn, WorkerContext};

    const LONG: Duration = Duration::from_secs(5);

    /// Signals readiness, then runs until stopped.
    fn well_behaved(launches: Arc<AtomicUsize>) -> RunnableRef {
        RunnableFn::arc("well-behaved", move |ctx: WorkerContext| {
            let launches = Arc::clone(&launches);
            async move {
                launches.fetch_add(1, Ordering::SeqCst);
                ctx.ready();
                ctx.cancelled().await;
                Ok::<_, RunnableError>(())
            }
        })
    }

    /// Signals readiness, then fails once asked to stop.
    fn fails_on_stop() -> RunnableRef {
        RunnableFn::arc("fails-on-stop", |ctx: WorkerContext| async move {
            ctx.ready();
            ctx.cancelled().await;
            Err::<(), RunnableError>("flush failed".into())
        })
    }

    /// Never signals readiness.
    fn never_ready() -> RunnableRef {
        RunnableFn::arc("never-ready", |ctx: WorkerContext| async move {
            ctx.cancelled().await;
            Ok::<_, RunnableError>(())
        })
    }

    #[test]
    fn test_start_and_wait_reaches_started() {
        let launches = Arc::new(AtomicUsize::new(0));
        let tlm = ThreadLifecycleManager::new(well_behaved(launches.clone())).expect("build");
        assert_eq!(tlm.state(), State::Stopped);

        tlm.start_and_wait(Duration::ZERO).expect("start");
        assert_eq!(tlm.state(), State::Started);
        assert_eq!(launches.load(Ordering::SeqCst), 1);
        assert!(tlm.worker_error().is_none());
    }

    #[test]
    fn test_start_then_stop_leaves_clean_stopped() {
        let tlm = ThreadLifecycleManager::new(well_behaved(Arc::default())).expect("build");

        tlm.start_and_wait(LONG).expect("start");
        tlm.stop_and_wait(LONG).expect("stop");

        assert_eq!(tlm.state(), State::Stopped);
        assert!(tlm.worker_error().is_none());
        assert_eq!(
            tlm.counters(),
            Counters {
                starting: 1,
                started: 1,
                stopping: 1,
                stopped: 1
            }
        );
    }

    #[test]
    fn test_counters_advance_once_per_entry() {
        let tlm = ThreadLifecycleManager::new(well_behaved(Arc::default())).expect("build");

        let mut last = tlm.counters();
        for cycle in 1..=3u64 {
            tlm.start_and_wait(LONG).expect("start");
            tlm.stop_and_wait(LONG).expect("stop");

            let now = tlm.counters();
            for s in [State::Starting, State::Started, State::Stopping, State::Stopped] {
                assert_eq!(now.entries(s), last.entries(s) + 1, "{s} in cycle {cycle}");
            }
            last = now;
        }
        assert_eq!(last.started, 3);
    }

    #[test]
    fn test_already_started_does_not_relaunch() {
        let launches = Arc::new(AtomicUsize::new(0));
        let tlm = ThreadLifecycleManager::new(well_behaved(launches.clone())).expect("build");

        tlm.start_and_wait(LONG).expect("start");
        tlm.start_and_wait(LONG).expect("second start");

        assert_eq!(launches.load(Ordering::SeqCst), 1);
        assert_eq!(tlm.counters().starting, 1);
    }

    #[test]
    fn test_stop_and_wait_on_stopped_returns_immediately() {
        let tlm = ThreadLifecycleManager::new(well_behaved(Arc::default())).expect("build");
        let begin = Instant::now();
        tlm.stop_and_wait(Duration::ZERO).expect("stop");
        assert!(begin.elapsed() < LONG);
        assert_eq!(tlm.counters(), Counters::default());
    }

    #[test]
    fn test_failure_is_raised_to_stop_waiter() {
        let tlm = ThreadLifecycleManager::new(fails_on_stop()).expect("build");

        tlm.start_and_wait(LONG).expect("start");
        let err = tlm.stop_and_wait(LONG).expect_err("worker failure");

        assert_eq!(err.as_label(), "lifecycle_worker_failed");
        assert!(err.to_string().contains("flush failed"), "{err}");
        assert_eq!(tlm.state(), State::Stopped);
        assert!(tlm.worker_error().is_some());
    }

    #[test]
    fn test_failure_before_ready_is_raised_to_start_waiter() {
        let r = RunnableFn::arc("dies-early", |_ctx: WorkerContext| async move {
            Err::<(), RunnableError>("cannot bind".into())
        });
        let tlm = ThreadLifecycleManager::new(r).expect("build");

        let err = tlm.start_and_wait(LONG).expect_err("worker failure");
        assert!(err.to_string().contains("cannot bind"), "{err}");
        assert_eq!(tlm.state(), State::Stopped);
        assert_eq!(tlm.counters().started, 0);
        assert_eq!(tlm.counters().stopped, 1);
    }

    #[test]
    fn test_lifecycle_error_passes_through_unchanged() {
        let r = RunnableFn::arc("own-error", |ctx: WorkerContext| async move {
            ctx.ready();
            ctx.cancelled().await;
            let own = LifecycleError::Configuration {
                reason: "bad upstream".to_string(),
            };
            Err::<(), RunnableError>(Box::new(own))
        });
        let tlm = ThreadLifecycleManager::new(r).expect("build");

        tlm.start_and_wait(LONG).expect("start");
        match tlm.stop_and_wait(LONG) {
            Err(LifecycleError::Configuration { reason }) => assert_eq!(reason, "bad upstream"),
            other => panic!("expected pass-through, got {other:?}"),
        }
    }

    #[test]
    fn test_panic_is_captured() {
        let r = RunnableFn::arc("panics-on-stop", |ctx: WorkerContext| async move {
            ctx.ready();
            ctx.cancelled().await;
            if ctx.is_cancelled() {
                panic!("torn state");
            }
            Ok::<_, RunnableError>(())
        });
        let tlm = ThreadLifecycleManager::new(r).expect("build");

        tlm.start_and_wait(LONG).expect("start");
        let err = tlm.stop_and_wait(LONG).expect_err("panic surfaces");

        let captured = tlm.worker_error().expect("captured");
        let panic = captured.downcast_ref::<WorkerPanic>().expect("WorkerPanic");
        assert_eq!(panic.message, "torn state");
        assert!(err.to_string().contains("torn state"), "{err}");
    }

    #[test]
    fn test_error_is_cleared_by_next_transition() {
        let tlm = ThreadLifecycleManager::new(fails_on_stop()).expect("build");

        tlm.start_and_wait(LONG).expect("start");
        assert!(tlm.stop_and_wait(LONG).is_err());

        tlm.start_and_wait(LONG).expect("restart sees a clean slot");
        assert!(tlm.worker_error().is_none());
        assert!(tlm.stop_and_wait(LONG).is_err());
    }

    #[test]
    fn test_timeout_without_readiness_is_not_an_error() {
        let tlm = ThreadLifecycleManager::new(never_ready()).expect("build");

        let begin = Instant::now();
        tlm.start_and_wait(Duration::from_millis(100)).expect("timeout is silent");
        let waited = begin.elapsed();

        assert!(waited >= Duration::from_millis(90), "returned after {waited:?}");
        assert!(waited < LONG, "returned after {waited:?}");
        assert_eq!(tlm.state(), State::Starting);

        tlm.stop_and_wait(LONG).expect("stop while starting");
        assert_eq!(tlm.state(), State::Stopped);
        assert_eq!(tlm.counters().started, 0);
    }

    #[test]
    fn test_concurrent_starts_launch_one_worker() {
        let launches = Arc::new(AtomicUsize::new(0));
        let tlm = Arc::new(ThreadLifecycleManager::new(well_behaved(launches.clone())).expect("build"));

        let callers: Vec<_> = (0..2)
            .map(|_| {
                let tlm = Arc::clone(&tlm);
                thread::spawn(move || tlm.start_and_wait(LONG))
            })
            .collect();
        for c in callers {
            c.join().expect("join").expect("start");
        }

        assert_eq!(tlm.state(), State::Started);
        assert_eq!(launches.load(Ordering::SeqCst), 1);
        assert_eq!(tlm.counters().starting, 1);
    }

    #[test]
    fn test_set_managed_runnable_rules() {
        let tlm = ThreadLifecycleManager::builder().build().expect("build");
        assert!(tlm.managed_runnable().is_none());

        tlm.set_managed_runnable(well_behaved(Arc::default())).expect("first attach");
        assert_eq!(tlm.managed_runnable().map(|r| r.name().to_string()).as_deref(), Some("well-behaved"));

        let err = tlm.set_managed_runnable(never_ready()).expect_err("second attach");
        assert_eq!(err.as_label(), "lifecycle_configuration");
    }

    #[test]
    fn test_attach_while_running_is_rejected() {
        let tlm = ThreadLifecycleManager::builder().build().expect("build");
        tlm.set_managed_runnable(never_ready()).expect("attach");
        tlm.start();

        let begin = Instant::now();
        while tlm.state() == State::Stopped && begin.elapsed() < LONG {
            thread::sleep(Duration::from_millis(5));
        }
        let err = tlm.set_managed_runnable(never_ready()).expect_err("not stopped");
        assert!(matches!(err, LifecycleError::Configuration { .. }));
    }

    #[test]
    fn test_start_without_runnable_reports_configuration_error() {
        let tlm = ThreadLifecycleManager::builder().build().expect("build");

        let err = tlm.start_and_wait(LONG).expect_err("nothing to run");
        assert!(matches!(err, LifecycleError::Configuration { .. }), "{err:?}");
        assert_eq!(tlm.state(), State::Stopped);
    }

    #[test]
    fn test_notifications_follow_transitions() {
        let tlm = ThreadLifecycleManager::new(fails_on_stop()).expect("build");
        let mut rx = tlm.subscribe();

        tlm.start_and_wait(LONG).expect("start");
        let _ = tlm.stop_and_wait(LONG);

        let started = rx.blocking_recv().expect("started");
        assert_eq!(started.kind, EventKind::RunnableStarted);
        assert_eq!(started.runnable.as_deref(), Some("fails-on-stop"));

        let stopped = rx.blocking_recv().expect("stopped");
        assert_eq!(stopped.kind, EventKind::RunnableStopped);
        assert!(stopped.is_failure());
        assert!(stopped.seq > started.seq);
    }

    #[test]
    fn test_shutdown_releases_waiter_and_rejects_reuse() {
        let tlm = Arc::new(ThreadLifecycleManager::new(never_ready()).expect("build"));

        let waiter = {
            let tlm = Arc::clone(&tlm);
            thread::spawn(move || tlm.start_and_wait(Duration::ZERO))
        };
        // The waiter holds the lock from posting until it parks, so `Starting`
        // means it is parked.
        let begin = Instant::now();
        while tlm.state() != State::Starting && begin.elapsed() < LONG {
            thread::sleep(Duration::from_millis(5));
        }
        tlm.shutdown();

        waiter.join().expect("join").expect("interrupted wait is graceful");
        assert!(tlm.is_shut_down());
        assert_eq!(tlm.state(), State::Stopped);
        assert!(tlm.managed_runnable().is_none());

        let err = tlm.start_and_wait(LONG).expect_err("no reuse");
        assert_eq!(err.as_label(), "lifecycle_illegal_state");
        tlm.start();
        tlm.shutdown();
    }

    #[test]
    fn test_borrowed_executor_survives_teardown() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("runtime");

        let tlm = ThreadLifecycleManager::builder()
            .with_runnable(well_behaved(Arc::default()))
            .with_executor(rt.handle().clone())
            .build()
            .expect("build");
        tlm.start_and_wait(LONG).expect("start");
        tlm.stop_and_wait(LONG).expect("stop");
        drop(tlm);

        let answer = rt.block_on(async { tokio::spawn(async { 42 }).await });
        assert_eq!(answer.ok(), Some(42));
    }

    /// Sets its flag when dropped.
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_owned_executor_is_released() {
        let dropped = Arc::new(AtomicBool::new(false));
        let stubborn = {
            let dropped = Arc::clone(&dropped);
            RunnableFn::arc("ignores-cancel", move |ctx: WorkerContext| {
                let flag = DropFlag(Arc::clone(&dropped));
                async move {
                    let _flag = flag;
                    ctx.ready();
                    std::future::pending::<()>().await;
                    Ok::<_, RunnableError>(())
                }
            })
        };
        let tlm = ThreadLifecycleManager::new(stubborn).expect("build");
        assert!(
            tlm.shared
                .monitor
                .lock()
                .executor
                .as_ref()
                .is_some_and(Executor::is_owned)
        );
        tlm.start_and_wait(LONG).expect("start");
        tlm.shutdown();

        // The worker ignores its token, so only the runtime going away drops it.
        let begin = Instant::now();
        while !dropped.load(Ordering::SeqCst) && begin.elapsed() < LONG {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(dropped.load(Ordering::SeqCst), "worker outlived its runtime");
        assert!(tlm.shared.monitor.lock().executor.is_none());
        assert_eq!(tlm.state(), State::Stopped);
        assert!(tlm.start_and_wait(LONG).is_err());
    }

    #[test]
    fn test_shutdown_leaves_stopped_without_counting() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("runtime");
        let tlm = ThreadLifecycleManager::builder()
            .with_runnable(well_behaved(Arc::default()))
            .with_executor(rt.handle().clone())
            .build()
            .expect("build");
        let mut rx = tlm.subscribe();

        tlm.start_and_wait(LONG).expect("start");
        tlm.shutdown();

        assert_eq!(tlm.state(), State::Stopped);
        assert_eq!(tlm.counters().stopped, 0);
        assert_eq!(
            rx.blocking_recv().map(|ev| ev.kind).ok(),
            Some(EventKind::RunnableStarted)
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_ready_from_an_ended_launch_is_ignored() {
        let kept: Arc<Mutex<Vec<WorkerContext>>> = Arc::default();
        let launches = Arc::new(AtomicUsize::new(0));
        let r = {
            let kept = Arc::clone(&kept);
            let launches = Arc::clone(&launches);
            RunnableFn::arc("keeps-context", move |ctx: WorkerContext| {
                let kept = Arc::clone(&kept);
                let first = launches.fetch_add(1, Ordering::SeqCst) == 0;
                async move {
                    if first {
                        kept.lock().push(ctx);
                        return Err::<(), RunnableError>("first launch fails".into());
                    }
                    ctx.cancelled().await;
                    Ok(())
                }
            })
        };
        let tlm = ThreadLifecycleManager::new(r).expect("build");

        assert!(tlm.start_and_wait(LONG).is_err());
        tlm.start_and_wait(Duration::from_millis(50))
            .expect("timeout is silent");
        assert_eq!(tlm.state(), State::Starting);

        let old = kept.lock().pop().expect("context of the first launch");
        old.ready();
        // The stop is queued behind the old ready, so both are handled on return.
        tlm.stop_and_wait(LONG).expect("stop while starting");

        assert_eq!(
            tlm.counters(),
            Counters {
                starting: 2,
                started: 0,
                stopping: 1,
                stopped: 2
            }
        );
    }

    /// Reports a different name after the first call.
    struct Renamed(AtomicBool);

    #[async_trait]
    impl ManagedRunnable for Renamed {
        fn name(&self) -> &str {
            if self.0.swap(true, Ordering::SeqCst) {
                "renamed"
            } else {
                "original"
            }
        }

        async fn run(&self, ctx: WorkerContext) -> Result<(), RunnableError> {
            ctx.ready();
            ctx.cancelled().await;
            Ok(())
        }
    }

    #[test]
    fn test_notifications_use_name_from_attach() {
        let tlm = ThreadLifecycleManager::builder().build().expect("build");
        tlm.set_managed_runnable(Arc::new(Renamed(AtomicBool::new(false))))
            .expect("attach");
        let mut rx = tlm.subscribe();

        tlm.start_and_wait(LONG).expect("start");
        tlm.stop_and_wait(LONG).expect("stop");

        for _ in 0..2 {
            let ev = rx.blocking_recv().expect("notification");
            assert_eq!(ev.runnable.as_deref(), Some("original"));
        }
    }

    #[test]
    fn test_wait_budget_runs_out() {
        let m = Mutex::new(());
        let cond = Condvar::new();
        let mut guard = m.lock();

        let begin = Instant::now();
        let mut budget = WaitBudget::new(Duration::from_millis(30));
        while budget.wait(&cond, &mut guard) {}

        assert!(begin.elapsed() >= Duration::from_millis(25));
        assert_eq!(budget.remaining, Some(Duration::ZERO));
        assert!(WaitBudget::new(Duration::ZERO).remaining.is_none());
    }
}
