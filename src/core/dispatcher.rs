//! # Event dispatcher: ordered, asynchronous delivery of lifecycle events.
//!
//! Every transition request goes through here so that posting never runs
//! transition logic on the poster's thread.
//!
//! ## Architecture
//! ```text
//! start()/stop() ──┐
//! Worker ──────────┼──► Poster ──► [unbounded mpsc] ──► dispatcher thread ──► handler(ev)
//! WorkerContext ───┘                                      (single consumer)
//! ```
//!
//! ## Rules
//! - `post()` never blocks; it is an unbounded channel send.
//! - Events from one poster are delivered in post order (FIFO).
//! - Exactly one consumer thread, so handlers never run concurrently.
//! - The thread exits on [`Poster::close`] or when every poster is gone.

use std::thread::{self, JoinHandle};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::state::LifecycleEvent;
use crate::error::LifecycleError;

/// Message consumed by the dispatcher thread.
#[derive(Debug)]
pub(crate) enum Dispatch {
    Event(LifecycleEvent),
    Shutdown,
}

/// Cloneable posting side of the dispatcher queue.
#[derive(Clone, Debug)]
pub(crate) struct Poster {
    tx: mpsc::UnboundedSender<Dispatch>,
}

impl Poster {
    /// Enqueues an event; returns `false` if the dispatcher is gone.
    pub(crate) fn post(&self, ev: LifecycleEvent) -> bool {
        let label = ev.as_label();
        match self.tx.send(Dispatch::Event(ev)) {
            Ok(()) => true,
            Err(_) => {
                warn!(event = label, "dispatcher stopped; event dropped");
                false
            }
        }
    }

    /// Asks the dispatcher thread to exit after draining what is queued before it.
    pub(crate) fn close(&self) {
        let _ = self.tx.send(Dispatch::Shutdown);
    }
}

/// Creates the dispatcher queue.
pub(crate) fn channel() -> (Poster, mpsc::UnboundedReceiver<Dispatch>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Poster { tx }, rx)
}

/// Spawns the consumer thread that feeds every queued event to `handler`.
pub(crate) fn spawn<H>(
    name: &str,
    mut rx: mpsc::UnboundedReceiver<Dispatch>,
    mut handler: H,
) -> Result<JoinHandle<()>, LifecycleError>
where
    H: FnMut(LifecycleEvent) + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            while let Some(msg) = rx.blocking_recv() {
                match msg {
                    Dispatch::Event(ev) => handler(ev),
                    Dispatch::Shutdown => break,
                }
            }
            debug!("dispatcher exited");
        })
        .map_err(|e| LifecycleError::spawn("dispatcher thread", e))
}
