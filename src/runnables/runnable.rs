//! # Managed runnable abstraction.
//!
//! This module defines the [`ManagedRunnable`] trait: the unit of work a
//! [`ThreadLifecycleManager`](crate::ThreadLifecycleManager) runs on its worker.
//! The common handle type is [`RunnableRef`], an `Arc<dyn ManagedRunnable>`.

use std::sync::Arc;

use async_trait::async_trait;

use super::WorkerContext;
use crate::error::RunnableError;

/// Shared handle to a managed runnable.
pub type RunnableRef = Arc<dyn ManagedRunnable>;

/// # Long-lived work supervised by the lifecycle manager.
///
/// `run` is invoked once per start. The implementation must:
/// - call [`WorkerContext::ready`] once it is up, which moves the manager from
///   `Starting` to `Started`;
/// - watch [`WorkerContext::cancelled`] and return promptly when a stop is requested.
///
/// Returning `Err` (or panicking) is reported as the worker's terminal error.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use threadvisor::{ManagedRunnable, RunnableError, WorkerContext};
///
/// struct Poller;
///
/// #[async_trait]
/// impl ManagedRunnable for Poller {
///     fn name(&self) -> &str { "poller" }
///
///     async fn run(&self, ctx: WorkerContext) -> Result<(), RunnableError> {
///         ctx.ready();
///         ctx.cancelled().await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait ManagedRunnable: Send + Sync + 'static {
    /// Returns a stable, human-readable name.
    fn name(&self) -> &str;

    /// Runs until completion, failure or cancellation.
    async fn run(&self, ctx: WorkerContext) -> Result<(), RunnableError>;
}
