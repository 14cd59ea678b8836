//! Runtime core: lifecycle state machine, dispatch and waiting.
//!
//! The public API from this module is [`ThreadLifecycleManager`] with its
//! builder, configuration, [`State`] and [`Counters`].
//!
//! Internal modules:
//! - `state`: states, internal events and the transition table;
//! - `dispatcher`: ordered asynchronous delivery of internal events;
//! - `worker`: one launch of the managed runnable, exactly-once termination;
//! - `executor`: owned or borrowed tokio runtime;
//! - `manager`: counters, captured error, blocking waits and teardown.

mod builder;
mod config;
mod dispatcher;
mod executor;
mod manager;
mod state;
mod worker;

pub use builder::ManagerBuilder;
pub use config::ManagerConfig;
pub use manager::ThreadLifecycleManager;
pub use state::{Counters, State};

#[cfg(test)]
pub(crate) use dispatcher::{Dispatch, channel as dispatch_channel};
pub(crate) use dispatcher::Poster;
pub(crate) use state::LifecycleEvent;
