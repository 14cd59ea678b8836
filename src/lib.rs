//! # threadvisor
//!
//! **Threadvisor** supervises the lifecycle of a single long-lived background
//! worker. It exposes a four-state machine and lets callers either
//! fire-and-forget transition requests or block until a transition completes,
//! with errors raised by the worker surfaced to the waiting caller.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   caller threads                        dispatcher thread              executor (tokio)
//! ┌──────────────────────┐  post   ┌────────────────────────────┐ spawn ┌──────────────────┐
//! │ start() / stop()     │────────►│ state.on_event(ev)         │──────►│ Worker           │
//! │ start_and_wait(t)    │         │   (transition table)       │       │  runnable.run()  │
//! │ stop_and_wait(t)     │         │ set_state(next, error)     │◄──────│  ctx.ready()     │
//! └──────────┬───────────┘         │   counters, error,         │ post  │  WorkerTerminated│
//!            │ wait on condvar     │   notify_all               │       └──────────────────┘
//!            └────────────────────►│ broadcast (outside lock)   │
//!                                  └─────────────┬──────────────┘
//!                                                ▼
//!                                  Bus / SubscriberSet (RunnableStarted, RunnableStopped)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Stopped ──start──► Starting ──ready──► Started ──stop──► Stopping ──exit──► Stopped
//!                       │                   │
//!                       ├──stop──► Stopping │
//!                       └──exit──► Stopped ◄┘ (exit while running or starting)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Lifecycle**     | Start/stop one worker, blocking or fire-and-forget.           | [`ThreadLifecycleManager`], [`State`]       |
//! | **Runnables**     | Define the supervised work as a trait impl or a closure.      | [`ManagedRunnable`], [`RunnableFn`]         |
//! | **Notifications** | Observe `Started`/`Stopped` transitions.                      | [`Event`], [`Subscribe`]                    |
//! | **Errors**        | Typed errors; worker failures reach the waiting caller.       | [`LifecycleError`]                          |
//! | **Configuration** | Bus capacity and thread names.                                | [`ManagerConfig`], [`ManagerBuilder`]       |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] subscriber _(demo/reference only)_.
//!
//! ## Known limitation
//! The captured worker error is last-write-wins: each transition overwrites it.
//! A failure in a cycle nobody waited on is not reported by later waits.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use threadvisor::{RunnableError, RunnableFn, State, ThreadLifecycleManager, WorkerContext};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runnable = RunnableFn::arc("heartbeat", |ctx: WorkerContext| async move {
//!         ctx.ready();
//!         while !ctx.is_cancelled() {
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!         }
//!         Ok::<_, RunnableError>(())
//!     });
//!
//!     let tlm = ThreadLifecycleManager::new(runnable)?;
//!     tlm.start_and_wait(Duration::from_secs(5))?;
//!     assert_eq!(tlm.state(), State::Started);
//!
//!     tlm.stop_and_wait(Duration::from_secs(5))?;
//!     assert_eq!(tlm.state(), State::Stopped);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod runnables;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{Counters, ManagerBuilder, ManagerConfig, State, ThreadLifecycleManager};
pub use error::{LifecycleError, RunnableError, SharedError, WorkerAborted, WorkerPanic};
pub use events::{Bus, Event, EventKind};
pub use runnables::{ManagedRunnable, RunnableFn, RunnableRef, WorkerContext};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
