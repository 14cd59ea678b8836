//! # Lifecycle states and the transition table.
//!
//! The manager exposes four states and reacts to four internal events. Which
//! event is legal in which state is decided in one place, [`State::on_event`],
//! so the full table can be reviewed at a glance:
//!
//! ```text
//!              StartRequested      WorkerReady   StopRequested       WorkerTerminated(e)
//! Stopped   →  Starting + launch   -             -                   -
//! Starting  →  -                   Started       Stopping + cancel   Stopped(e)
//! Started   →  -                   -             Stopping + cancel   Stopped(e)
//! Stopping  →  -                   -             -                   Stopped(e)
//! ```
//!
//! `-` is a no-op: the event is consumed without a transition.
//!
//! Worker events carry the id of the launch that produced them. The manager
//! drops those whose id is not the current launch before consulting the table.

use std::fmt;

use crate::error::SharedError;

/// Externally visible lifecycle state of the managed worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// No worker is running. Initial and terminal state.
    Stopped,
    /// A worker was launched and has not signalled readiness yet.
    Starting,
    /// The worker signalled readiness and is running.
    Started,
    /// A stop was requested; waiting for the worker to exit.
    Stopping,
}

impl State {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            State::Stopped => "stopped",
            State::Starting => "starting",
            State::Started => "started",
            State::Stopping => "stopping",
        }
    }

    /// Handler for [`LifecycleEvent::StartRequested`].
    pub(crate) fn on_start_requested(self) -> Option<Transition> {
        match self {
            State::Stopped => Some(Transition::new(State::Starting, Effect::LaunchWorker)),
            State::Starting | State::Started | State::Stopping => None,
        }
    }

    /// Handler for [`LifecycleEvent::WorkerReady`].
    pub(crate) fn on_worker_ready(self) -> Option<Transition> {
        match self {
            State::Starting => Some(Transition::new(State::Started, Effect::None)),
            State::Stopped | State::Started | State::Stopping => None,
        }
    }

    /// Handler for [`LifecycleEvent::StopRequested`].
    pub(crate) fn on_stop_requested(self) -> Option<Transition> {
        match self {
            State::Starting | State::Started => {
                Some(Transition::new(State::Stopping, Effect::CancelWorker))
            }
            State::Stopped | State::Stopping => None,
        }
    }

    /// Handler for [`LifecycleEvent::WorkerTerminated`].
    ///
    /// A termination seen while `Stopped` is stale and ignored.
    pub(crate) fn on_worker_terminated(self) -> Option<Transition> {
        match self {
            State::Starting | State::Started | State::Stopping => {
                Some(Transition::new(State::Stopped, Effect::None))
            }
            State::Stopped => None,
        }
    }

    /// Routes an event to the handler matching its kind.
    pub(crate) fn on_event(self, event: &LifecycleEvent) -> Option<Transition> {
        match event {
            LifecycleEvent::StartRequested => self.on_start_requested(),
            LifecycleEvent::WorkerReady { .. } => self.on_worker_ready(),
            LifecycleEvent::StopRequested => self.on_stop_requested(),
            LifecycleEvent::WorkerTerminated { .. } => self.on_worker_terminated(),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Internal events posted to the dispatcher.
#[derive(Debug, Clone)]
pub(crate) enum LifecycleEvent {
    /// A caller asked for a start.
    StartRequested,
    /// The runnable of launch `launch` signalled that it is running.
    WorkerReady { launch: u64 },
    /// A caller asked for a stop.
    StopRequested,
    /// The worker of launch `launch` exited; carries the escaping error, if any.
    WorkerTerminated {
        launch: u64,
        error: Option<SharedError>,
    },
}

impl LifecycleEvent {
    pub(crate) fn as_label(&self) -> &'static str {
        match self {
            LifecycleEvent::StartRequested => "start_requested",
            LifecycleEvent::WorkerReady { .. } => "worker_ready",
            LifecycleEvent::StopRequested => "stop_requested",
            LifecycleEvent::WorkerTerminated { .. } => "worker_terminated",
        }
    }

    /// Launch id of a worker event; `None` for caller requests.
    pub(crate) fn launch(&self) -> Option<u64> {
        match self {
            LifecycleEvent::WorkerReady { launch }
            | LifecycleEvent::WorkerTerminated { launch, .. } => Some(*launch),
            LifecycleEvent::StartRequested | LifecycleEvent::StopRequested => None,
        }
    }
}

/// Side effect the manager performs when applying a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    None,
    /// Spawn a worker on the executor.
    LaunchWorker,
    /// Cancel the running worker's token.
    CancelWorker,
}

/// Result of a legal event: the state to enter and what to do about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transition {
    pub next: State,
    pub effect: Effect,
}

impl Transition {
    fn new(next: State, effect: Effect) -> Self {
        Self { next, effect }
    }
}

/// Per-state entry counters.
///
/// Each field counts how many times the machine has **entered** that state.
/// Waiters snapshot them to tell "nothing happened yet" apart from "a whole
/// cycle happened before I looked".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Entries into [`State::Starting`].
    pub starting: u64,
    /// Entries into [`State::Started`].
    pub started: u64,
    /// Entries into [`State::Stopping`].
    pub stopping: u64,
    /// Entries into [`State::Stopped`] (the initial state is not counted).
    pub stopped: u64,
}

impl Counters {
    /// Records one entry into `state`.
    pub(crate) fn record(&mut self, state: State) {
        match state {
            State::Starting => self.starting += 1,
            State::Started => self.started += 1,
            State::Stopping => self.stopping += 1,
            State::Stopped => self.stopped += 1,
        }
    }

    /// Number of entries into `state`.
    pub fn entries(&self, state: State) -> u64 {
        match state {
            State::Starting => self.starting,
            State::Started => self.started,
            State::Stopping => self.stopping,
            State::Stopped => self.stopped,
        }
    }
}
