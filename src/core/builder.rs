use std::sync::Arc;

use tokio::runtime::Handle;

use super::config::ManagerConfig;
use super::executor::Executor;
use super::manager::ThreadLifecycleManager;
use crate::error::LifecycleError;
use crate::runnables::RunnableRef;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for constructing a [`ThreadLifecycleManager`] with optional features.
pub struct ManagerBuilder {
    cfg: ManagerConfig,
    runnable: Option<RunnableRef>,
    executor: Option<Handle>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ManagerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: ManagerConfig) -> Self {
        Self {
            cfg,
            runnable: None,
            executor: None,
            subscribers: Vec::new(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: ManagerConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the managed runnable.
    ///
    /// May be left out and attached later with
    /// [`ThreadLifecycleManager::set_managed_runnable`].
    pub fn with_runnable(mut self, runnable: RunnableRef) -> Self {
        self.runnable = Some(runnable);
        self
    }

    /// Runs workers on a caller-owned runtime.
    ///
    /// The manager never shuts this runtime down. Without it, the manager
    /// creates and owns a single-thread runtime.
    pub fn with_executor(mut self, handle: Handle) -> Self {
        self.executor = Some(handle);
        self
    }

    /// Sets subscribers for lifecycle notifications.
    ///
    /// Subscriber workers run on the manager's executor.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the manager in `Stopped`:
    /// - executor (borrowed handle, or a new owned runtime)
    /// - subscriber workers
    /// - dispatcher thread
    pub fn build(self) -> Result<ThreadLifecycleManager, LifecycleError> {
        let executor = match self.executor {
            Some(handle) => Executor::borrowed(handle),
            None => Executor::owned(&self.cfg.worker_thread_name)?,
        };
        let subs = SubscriberSet::new(self.subscribers, &executor.handle());
        ThreadLifecycleManager::new_internal(&self.cfg, executor, self.runnable, subs)
    }
}
