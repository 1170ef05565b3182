//! # Engine commands and their delivery.
//!
//! The engine delivers commands (script output, errors, exit codes, aggregated
//! data) to a session; the session fans them out to its command listeners
//! through the application's [`CommandDispatcher`].
//!
//! ## Architecture
//! ```text
//! Engine ── dispatch_command(cmd) ──► TaskController
//!                                          │ snapshot(command_listeners)
//!                                          ▼
//!                                   DispatchHandle::post()
//!                                          │ (returns immediately)
//!                                          ▼
//!                                   dispatcher worker
//!                                  ┌───────┼─────────┐
//!                                  ▼       ▼         ▼
//!                          ConsoleWriter  LogWriter  custom
//! ```
//!
//! ## Contents
//! - [`Command`] engine-originated payloads
//! - [`CommandListener`] observer trait
//! - [`CommandDispatcher`], [`DispatchHandle`] worker pool and its posting side
//! - [`ConsoleWriter`] built-in listener rendering to the session console

mod command;
mod console;
mod dispatcher;
mod listener;

pub use command::Command;
pub use console::ConsoleWriter;
pub use dispatcher::{CommandDispatcher, DispatchHandle};
pub use listener::CommandListener;
