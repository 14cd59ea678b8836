//! # Public lifecycle notifications.
//!
//! The manager broadcasts an [`Event`] every time the worker enters
//! [`State::Started`](crate::State::Started) or
//! [`State::Stopped`](crate::State::Stopped):
//! - [`EventKind::RunnableStarted`]: the runnable signalled readiness
//! - [`EventKind::RunnableStopped`]: the worker exited (carries its error, if any)
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use threadvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RunnableStarted).with_runnable("ingest");
//!
//! assert_eq!(ev.kind, EventKind::RunnableStarted);
//! assert_eq!(ev.runnable.as_deref(), Some("ingest"));
//! assert!(ev.error.is_none());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::error::SharedError;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of public notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The managed runnable is running.
    ///
    /// Sets:
    /// - `runnable`: runnable name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RunnableStarted,

    /// The worker terminated (successfully, with an error, or aborted).
    ///
    /// Sets:
    /// - `runnable`: runnable name (absent after teardown)
    /// - `error`: captured worker error, if any
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RunnableStopped,
}

impl EventKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::RunnableStarted => "runnable_started",
            EventKind::RunnableStopped => "runnable_stopped",
        }
    }
}

/// Lifecycle notification with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the managed runnable, if one is attached.
    pub runnable: Option<Arc<str>>,
    /// Error the worker terminated with (only for `RunnableStopped`).
    pub error: Option<SharedError>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            runnable: None,
            error: None,
        }
    }

    /// Attaches the runnable name.
    #[inline]
    pub fn with_runnable(mut self, name: impl Into<Arc<str>>) -> Self {
        self.runnable = Some(name.into());
        self
    }

    /// Attaches the worker error.
    #[inline]
    pub fn with_error(mut self, error: SharedError) -> Self {
        self.error = Some(error);
        self
    }

    /// True if the event reports a worker that stopped with an error.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self.kind, EventKind::RunnableStopped) && self.error.is_some()
    }
}
