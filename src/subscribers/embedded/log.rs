//! # LogWriter: notification logger
//!
//! A minimal subscriber that renders lifecycle notifications through
//! `tracing`. Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! INFO  runnable started runnable="ingest" seq=3
//! INFO  runnable stopped runnable="ingest" seq=4
//! WARN  runnable stopped with error runnable="ingest" seq=7 error=worker had uncaught error: boom
//! ```

use async_trait::async_trait;
use tracing::{info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Notification logger subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let runnable = e.runnable.as_deref().unwrap_or("unknown");
        match (e.kind, &e.error) {
            (EventKind::RunnableStarted, _) => {
                info!(runnable, seq = e.seq, "runnable started");
            }
            (EventKind::RunnableStopped, None) => {
                info!(runnable, seq = e.seq, "runnable stopped");
            }
            (EventKind::RunnableStopped, Some(err)) => {
                warn!(runnable, seq = e.seq, error = %err, "runnable stopped with error");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
