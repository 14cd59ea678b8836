//! # Worker executor: owned or borrowed tokio runtime.
//!
//! The manager launches workers on a tokio runtime it either created itself
//! ([`Executor::Owned`], one worker thread) or received from the caller
//! ([`Executor::Borrowed`]). Only an owned runtime is ever torn down here.

use std::fmt;

use tokio::runtime::{Builder, Handle, Runtime};

use crate::error::LifecycleError;

pub(crate) enum Executor {
    /// Runtime created and torn down by the manager.
    Owned(Runtime),
    /// Caller's runtime; never shut down by the manager.
    Borrowed(Handle),
}

impl Executor {
    /// Creates an owned runtime with a single named worker thread.
    pub(crate) fn owned(thread_name: &str) -> Result<Self, LifecycleError> {
        let rt = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name(thread_name)
            .enable_all()
            .build()
            .map_err(|e| LifecycleError::spawn("worker runtime", e))?;
        Ok(Executor::Owned(rt))
    }

    pub(crate) fn borrowed(handle: Handle) -> Self {
        Executor::Borrowed(handle)
    }

    /// Handle used to spawn workers (and subscriber workers).
    pub(crate) fn handle(&self) -> Handle {
        match self {
            Executor::Owned(rt) => rt.handle().clone(),
            Executor::Borrowed(h) => h.clone(),
        }
    }

    pub(crate) fn is_owned(&self) -> bool {
        matches!(self, Executor::Owned(_))
    }

    /// Releases the executor.
    ///
    /// An owned runtime is shut down without waiting for in-flight work; a
    /// borrowed handle is just dropped.
    pub(crate) fn shutdown(self) {
        match self {
            Executor::Owned(rt) => rt.shutdown_background(),
            Executor::Borrowed(_) => {}
        }
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Executor::Owned(_) => f.write_str("Executor::Owned"),
            Executor::Borrowed(_) => f.write_str("Executor::Borrowed"),
        }
    }
}
