//! # Managed runnables.
//!
//! This module provides the work-side types:
//! - [`ManagedRunnable`] - trait for the work a manager supervises
//! - [`RunnableFn`] - function-based implementation
//! - [`RunnableRef`] - shared reference (`Arc<dyn ManagedRunnable>`)
//! - [`WorkerContext`] - readiness signal and cancellation for one launch

mod context;
mod runnable;
mod runnable_fn;

pub use context::WorkerContext;
pub use runnable::{ManagedRunnable, RunnableRef};
pub use runnable_fn::RunnableFn;
