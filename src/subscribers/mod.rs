//! # Notification subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and, behind the `logging` feature, the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! dispatcher ── set_state(Started|Stopped) ──► Bus ──► ThreadLifecycleManager::subscribe()
//!                                         └──► SubscriberSet::emit(&Event)
//!                                                   │
//!                                        ┌──────────┼──────────┐
//!                                        ▼          ▼          ▼
//!                                    LogWriter   Metrics    Custom ...
//! ```

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod embedded;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
