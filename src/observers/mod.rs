//! # Ready-made session observers.
//!
//! - [`LogWriter`] (enabled via the `logging` feature): forwards state changes
//!   and engine commands to `tracing` at `info` level.

mod log;

pub use log::LogWriter;
