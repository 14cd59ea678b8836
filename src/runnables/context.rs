//! # Worker context handed to a managed runnable.
//!
//! Gives the runnable its two channels back to the manager:
//! - [`WorkerContext::ready`] reports that the runnable is up (`Starting → Started`);
//! - the cancellation token reports that a stop was requested.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

use crate::core::{LifecycleEvent, Poster};

/// Per-launch context passed to [`ManagedRunnable::run`](super::ManagedRunnable::run).
///
/// Cheap to clone; all clones share the same readiness flag and token. A
/// clone kept past the end of its launch cannot affect a later launch.
#[derive(Clone, Debug)]
pub struct WorkerContext {
    token: CancellationToken,
    ready: Arc<ReadySignal>,
}

#[derive(Debug)]
struct ReadySignal {
    fired: AtomicBool,
    launch: u64,
    poster: Poster,
}

impl WorkerContext {
    pub(crate) fn new(token: CancellationToken, poster: Poster, launch: u64) -> Self {
        Self {
            token,
            ready: Arc::new(ReadySignal {
                fired: AtomicBool::new(false),
                launch,
                poster,
            }),
        }
    }

    /// Signals that the runnable has begun running.
    ///
    /// Only the first call per launch has an effect.
    pub fn ready(&self) {
        if !self.ready.fired.swap(true, Ordering::AcqRel) {
            self.ready.poster.post(LifecycleEvent::WorkerReady {
                launch: self.ready.launch,
            });
        }
    }

    /// True once [`ready`](Self::ready) has been called.
    pub fn is_ready(&self) -> bool {
        self.ready.fired.load(Ordering::Acquire)
    }

    /// Token cancelled when a stop is requested or the manager shuts down.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// True if a stop has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when a stop has been requested.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}
