//! # Built-in subscribers
//!
//! - [`LogWriter`]: renders notifications through `tracing` (demo/debug).

mod log;

pub use log::LogWriter;
