//! # Manager configuration.
//!
//! Provides [`ManagerConfig`] centralized settings for a
//! [`ThreadLifecycleManager`](crate::ThreadLifecycleManager).
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by the bus

/// Configuration for a lifecycle manager.
///
/// ## Field semantics
/// - `bus_capacity`: ring buffer size of the public notification bus (min 1)
/// - `worker_thread_name`: name of the thread backing an owned executor
/// - `dispatcher_thread_name`: name of the thread that applies transitions
///
/// All fields are public; prefer the helper accessors over sentinel checks.
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    /// Capacity of the public notification broadcast channel.
    ///
    /// Receivers that lag more than `bus_capacity` notifications observe
    /// `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Thread name for the owned single-thread executor.
    ///
    /// Unused when the caller supplies its own runtime handle.
    pub worker_thread_name: String,

    /// Thread name for the event dispatcher.
    pub dispatcher_thread_name: String,
}

impl ManagerConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ManagerConfig {
    /// Default configuration:
    ///
    /// - `bus_capacity = 64`
    /// - `worker_thread_name = "threadvisor-worker"`
    /// - `dispatcher_thread_name = "threadvisor-dispatch"`
    fn default() -> Self {
        Self {
            bus_capacity: 64,
            worker_thread_name: "threadvisor-worker".to_string(),
            dispatcher_thread_name: "threadvisor-dispatch".to_string(),
        }
    }
}
