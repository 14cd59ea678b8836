//! Error types used by the lifecycle manager and its worker.
//!
//! This module defines:
//!
//! - [`LifecycleError`]: errors surfaced to callers of the manager API.
//! - [`RunnableError`]: the boxed error a managed runnable returns.
//! - [`WorkerPanic`] / [`WorkerAborted`]: terminal outcomes the worker
//!   synthesizes when the runnable did not return normally.
//!
//! [`LifecycleError`] provides `as_label` for logging/metrics, like the rest
//! of the crate's labelled types.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

use crate::core::State;

/// Error type returned by a managed runnable.
pub type RunnableError = Box<dyn StdError + Send + Sync + 'static>;

/// Shared, type-erased error as stored in the captured-error slot.
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// # Errors produced by the lifecycle manager.
///
/// Cloneable so the captured worker error can be handed to every waiter that
/// observes it while the slot keeps its own reference.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum LifecycleError {
    /// Invalid attachment of a managed runnable, or a launch with none attached.
    #[error("configuration error: {reason}")]
    Configuration {
        /// What was wrong with the configuration.
        reason: String,
    },

    /// Operation not allowed in the manager's current state.
    #[error("illegal state {state}: {reason}")]
    IllegalState {
        /// State observed when the operation was rejected.
        state: State,
        /// Why the operation was rejected.
        reason: String,
    },

    /// The managed runnable terminated with an error of a foreign type.
    #[error("worker had uncaught error: {source}")]
    WorkerFailed {
        /// The error that escaped the runnable.
        #[source]
        source: SharedError,
    },

    /// A runtime or thread backing the manager could not be created.
    #[error("failed to spawn {what}: {source}")]
    Spawn {
        /// Which resource failed to start.
        what: &'static str,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl LifecycleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use threadvisor::LifecycleError;
    ///
    /// let err = LifecycleError::Configuration { reason: "twice".into() };
    /// assert_eq!(err.as_label(), "lifecycle_configuration");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LifecycleError::Configuration { .. } => "lifecycle_configuration",
            LifecycleError::IllegalState { .. } => "lifecycle_illegal_state",
            LifecycleError::WorkerFailed { .. } => "lifecycle_worker_failed",
            LifecycleError::Spawn { .. } => "lifecycle_spawn_failed",
        }
    }

    /// Converts a captured worker error into the error raised to a waiter.
    ///
    /// A [`LifecycleError`] escaping the runnable passes through unchanged;
    /// anything else is wrapped as [`LifecycleError::WorkerFailed`].
    pub(crate) fn from_worker(err: &SharedError) -> Self {
        match err.downcast_ref::<LifecycleError>() {
            Some(own) => own.clone(),
            None => LifecycleError::WorkerFailed {
                source: Arc::clone(err),
            },
        }
    }

    pub(crate) fn spawn(what: &'static str, source: std::io::Error) -> Self {
        LifecycleError::Spawn {
            what,
            source: Arc::new(source),
        }
    }
}

/// The managed runnable panicked; carries the panic message when it was a string.
#[derive(Error, Debug, Clone)]
#[error("runnable '{runnable}' panicked: {message}")]
pub struct WorkerPanic {
    /// Name of the runnable that panicked.
    pub runnable: String,
    /// Panic payload rendered as text.
    pub message: String,
}

impl WorkerPanic {
    pub(crate) fn from_payload(runnable: &str, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self {
            runnable: runnable.to_string(),
            message,
        }
    }
}

/// The worker was dropped by its executor before the runnable returned.
///
/// Happens when an owned runtime is torn down while the worker is running.
#[derive(Error, Debug, Clone)]
#[error("runnable '{runnable}' was aborted before completion")]
pub struct WorkerAborted {
    /// Name of the aborted runnable.
    pub runnable: String,
}
