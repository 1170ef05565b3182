//! # tracevisor
//!
//! **Tracevisor** is the session layer of a dynamic-instrumentation tool.
//!
//! A [`TaskController`] represents one tracing script bound to one target
//! process and one instrumentation [`Engine`]. It tracks the session lifecycle,
//! derives metadata from the script text, assembles the class path handed to
//! the engine, and fans engine output out to observers without blocking the
//! engine's threads.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  UI / CLI ── start()/stop()/send_event() ──► TaskController ──► Engine
//!                                                  ▲   │            │
//!                     EngineListener callbacks     │   │            │
//!          (onTaskStart/onTaskStop/instrumenting)  └───┼────────────┘
//!                                                      │
//!                       ┌──────────────────────────────┼──────────────┐
//!                       ▼                              ▼              ▼
//!               StateListener fan-out     CommandDispatcher     ScriptMetadata
//!               (sync, caller thread)     (per-session FIFO     ClassPathBuilder
//!                                          worker queues)
//!                                                │
//!                                   ┌────────────┼────────────┐
//!                                   ▼            ▼            ▼
//!                             ConsoleWriter   LogWriter   custom listener
//! ```
//!
//! ### Lifecycle
//! ```text
//!            start()                engine: instrumenting
//!  New ──────────────► Starting ─────────────────────────► Instrumenting
//!   ▲                    │   │                                  │
//!   └── start failed ────┘   │ engine: started                  │ engine: started
//!                            ▼                                  ▼
//!                         Running ◄─────────────────────────────┘
//!                            │ stop() + engine: stopped
//!                            ▼
//!                         Finished ── start() ──► Starting ...
//! ```
//!
//! ## Features
//! | Area              | Description                                                | Key types / traits                         |
//! |-------------------|------------------------------------------------------------|--------------------------------------------|
//! | **Sessions**      | Lifecycle, script, class path and observers of a session.  | [`TaskController`], [`TaskState`]          |
//! | **Engine**        | Contract of the instrumentation backend and its callbacks. | [`Engine`], [`EngineListener`]             |
//! | **Commands**      | Off-thread, per-session ordered delivery of engine output. | [`Command`], [`CommandDispatcher`]         |
//! | **Script**        | Name, unsafe flag and event handlers declared by a script. | [`ScriptMetadata`]                         |
//! | **Class path**    | Target class path rebased on its working dir plus entries. | [`ClassPathBuilder`], [`ProcessDetails`]   |
//! | **Errors**        | Typed errors for engine requests and command delivery.     | [`EngineError`], [`DispatchError`]         |
//! | **Configuration** | Dispatcher sizing.                                         | [`Config`]                                 |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], an observer tracing every state change and command.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tracevisor::{
//!     CommandDispatcher, Config, Engine, EngineError, EngineId, EngineListener,
//!     EngineListeners, ListenerId, TaskController, TaskState,
//! };
//!
//! // An engine that accepts everything and reports transitions immediately.
//! struct Immediate {
//!     id: EngineId,
//!     listeners: EngineListeners,
//! }
//!
//! #[async_trait]
//! impl Engine for Immediate {
//!     fn id(&self) -> EngineId { self.id }
//!
//!     async fn start(&self, task: &TaskController) -> Result<(), EngineError> {
//!         self.listeners.notify_start(&task.id());
//!         Ok(())
//!     }
//!
//!     async fn stop(&self, task: &TaskController) -> Result<(), EngineError> {
//!         self.listeners.notify_stop(&task.id());
//!         Ok(())
//!     }
//!
//!     async fn send_event(&self, _: &TaskController, _: Option<&str>) -> Result<(), EngineError> {
//!         Ok(())
//!     }
//!
//!     fn add_listener(&self, l: Arc<dyn EngineListener>) -> ListenerId { self.listeners.add(l) }
//!
//!     fn remove_listener(&self, id: ListenerId) { self.listeners.remove(id); }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), EngineError> {
//!     let engine = Arc::new(Immediate { id: EngineId::next(), listeners: EngineListeners::new() });
//!     let dispatcher = CommandDispatcher::new(&Config::default());
//!
//!     let session = TaskController::builder(4242, engine, dispatcher.handle())
//!         .with_script(r#"@BTrace(name = "probe") public class Probe {}"#)
//!         .build();
//!
//!     session.start().await?;
//!     assert_eq!(session.state(), TaskState::Running);
//!     session.stop().await?;
//!     assert_eq!(session.state(), TaskState::Finished);
//!
//!     dispatcher.shutdown().await;
//!     Ok(())
//! }
//! ```
mod classpath;
mod commands;
mod config;
mod core;
mod engine;
mod error;
mod script;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use classpath::{
    CLASS_PATH_PROPERTY, ClassPathBuilder, NullProcessDetails, PATH_SEPARATOR, ProcessDetails,
    USER_DIR_PROPERTY,
};
pub use commands::{Command, CommandDispatcher, CommandListener, ConsoleWriter, DispatchHandle};
pub use config::Config;
pub use crate::core::{OutputSink, StateListener, TaskController, TaskControllerBuilder, TaskId, TaskState};
pub use engine::{Engine, EngineId, EngineListener, EngineListeners, ListenerId};
pub use error::{DispatchError, EngineError};
pub use script::ScriptMetadata;

// Optional: expose a tracing observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
mod observers;
#[cfg(feature = "logging")]
pub use observers::LogWriter;
