//! # Worker: runs one launch of the managed runnable.
//!
//! A worker is created by the manager when `Stopped` accepts a start, and is
//! spawned on the executor. It reports back through the dispatcher:
//!
//! ```text
//! spawn(worker.run())
//!   ├─► runnable.run(ctx)
//!   │     └─► ctx.ready()          ──► WorkerReady        (at most once)
//!   └─► on exit                    ──► WorkerTerminated   (exactly once)
//!         Ok(())                   → no error
//!         Err(e)                   → e
//!         panic                    → WorkerPanic
//!         dropped by the executor  → WorkerAborted
//! ```
//!
//! Exactly-once termination is held by [`TerminalGuard`]: it lives inside the
//! worker, so it reports even if the future is dropped before its first poll.
//! Both events carry the launch id so the manager can discard reports from a
//! launch that is no longer current.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::dispatcher::Poster;
use super::state::LifecycleEvent;
use crate::error::{SharedError, WorkerAborted, WorkerPanic};
use crate::runnables::{RunnableRef, WorkerContext};

pub(crate) struct Worker {
    runnable: RunnableRef,
    ctx: WorkerContext,
    guard: TerminalGuard,
}

impl Worker {
    pub(crate) fn new(
        runnable: RunnableRef,
        poster: Poster,
        token: CancellationToken,
        launch: u64,
    ) -> Self {
        let guard = TerminalGuard {
            poster: poster.clone(),
            runnable: runnable.name().to_string(),
            launch,
            sent: false,
        };
        Self {
            ctx: WorkerContext::new(token, poster, launch),
            runnable,
            guard,
        }
    }

    /// Runs the runnable to completion and reports its outcome.
    pub(crate) async fn run(self) {
        let Worker {
            runnable,
            ctx,
            guard,
        } = self;
        debug!(runnable = runnable.name(), "worker running");

        let outcome = AssertUnwindSafe(runnable.run(ctx)).catch_unwind().await;
        let error: Option<SharedError> = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(Arc::from(e)),
            Err(payload) => Some(Arc::new(WorkerPanic::from_payload(
                runnable.name(),
                payload.as_ref(),
            ))),
        };
        debug!(
            runnable = runnable.name(),
            failed = error.is_some(),
            "worker finished"
        );
        guard.finish(error);
    }
}

/// Posts the worker's single `WorkerTerminated` event.
struct TerminalGuard {
    poster: Poster,
    runnable: String,
    launch: u64,
    sent: bool,
}

impl TerminalGuard {
    fn finish(mut self, error: Option<SharedError>) {
        self.sent = true;
        self.poster.post(LifecycleEvent::WorkerTerminated {
            launch: self.launch,
            error,
        });
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if !self.sent {
            let aborted = WorkerAborted {
                runnable: std::mem::take(&mut self.runnable),
            };
            self.poster.post(LifecycleEvent::WorkerTerminated {
                launch: self.launch,
                error: Some(Arc::new(aborted)),
            });
        }
    }
}
