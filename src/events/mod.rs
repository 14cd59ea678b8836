//! Public lifecycle notifications: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] notification classification and payload
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publisher**: the manager's dispatcher thread, right after a transition
//!   into `Started` or `Stopped` (outside the manager lock).
//! - **Consumers**: receivers from `ThreadLifecycleManager::subscribe()` and the
//!   `SubscriberSet` workers.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
