//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for reacting to lifecycle notifications.
//! Each subscriber is driven by a dedicated worker task fed by a bounded queue
//! owned by the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow; they do **not** block the dispatcher nor
//!   other subscribers.
//! - If a queue overflows, notifications for that subscriber are **dropped** (warn).
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use threadvisor::{Event, EventKind, Subscribe};
//!
//! struct Alerts;
//!
//! #[async_trait]
//! impl Subscribe for Alerts {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.is_failure() {
//!             // page someone...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "alerts" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for notification subscribers.
///
/// Called from a subscriber-dedicated worker task on the manager's executor.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single notification.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        64
    }
}
