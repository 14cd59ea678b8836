//! # Function-backed runnable (`RunnableFn`)
//!
//! [`RunnableFn`] wraps a closure `F: Fn(WorkerContext) -> Fut`, producing a
//! fresh future per start. No state is shared between runs unless the closure
//! captures an `Arc<...>` explicitly.
//!
//! ## Example
//! ```rust
//! use threadvisor::{RunnableError, RunnableFn, RunnableRef, WorkerContext};
//!
//! let r: RunnableRef = RunnableFn::arc("worker", |ctx: WorkerContext| async move {
//!     ctx.ready();
//!     ctx.cancelled().await;
//!     Ok::<_, RunnableError>(())
//! });
//!
//! assert_eq!(r.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::{ManagedRunnable, WorkerContext};
use crate::error::RunnableError;

/// Function-backed runnable implementation.
#[derive(Debug)]
pub struct RunnableFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> RunnableFn<F> {
    /// Creates a new function-backed runnable.
    ///
    /// Prefer [`RunnableFn::arc`] when you immediately need a [`RunnableRef`](super::RunnableRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the runnable and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> ManagedRunnable for RunnableFn<F>
where
    F: Fn(WorkerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), RunnableError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: WorkerContext) -> Result<(), RunnableError> {
        (self.f)(ctx).await
    }
}
