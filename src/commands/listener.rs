//! # Command listener trait
//!
//! `CommandListener` is the extension point for observers of engine commands.
//! Listeners are invoked from a dispatcher worker, never from the thread that
//! posted the command.
//!
//! ## Contract
//! - Implementations may be slow; they only delay later commands routed to the
//!   same worker, never the engine.
//! - A panic inside `on_command` is caught and logged; the listener stays
//!   registered.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use tracevisor::{Command, CommandListener};
//!
//! struct ErrorCounter(AtomicUsize);
//!
//! #[async_trait::async_trait]
//! impl CommandListener for ErrorCounter {
//!     async fn on_command(&self, command: &Command) {
//!         if let Command::Error(_) = command {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "error-counter" }
//! }
//! ```

use async_trait::async_trait;

use super::Command;

/// Observer of engine-delivered commands.
#[async_trait]
pub trait CommandListener: Send + Sync + 'static {
    /// Handles one command.
    async fn on_command(&self, command: &Command);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
