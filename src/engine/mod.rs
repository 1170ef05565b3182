//! # Instrumentation engine contract.
//!
//! The engine performs the actual attach/inject/detach against a target
//! process. This crate only consumes it:
//!
//! - [`Engine`] - start/stop/event requests issued by a session.
//! - [`EngineListener`] - callbacks the engine uses to report task transitions.
//! - [`EngineListeners`] - a pruned listener registry engines can embed.
//!
//! ## Callback flow
//! ```text
//! TaskController::start() ──► Engine::start(&session)
//!                                   │
//!                      (sync or later, any thread)
//!                                   ▼
//!                 EngineListeners::notify_start(&task_id)
//!                                   │
//!              ┌────────────────────┼────────────────────┐
//!              ▼                    ▼                    ▼
//!        session A (match)    session B (ignore)   closed (pruned)
//! ```

mod listeners;

pub use listeners::EngineListeners;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::core::{TaskController, TaskId};
use crate::error::EngineError;

/// Global counter for engine identities.
static ENGINE_SEQ: AtomicU64 = AtomicU64::new(1);

/// Global counter for listener registrations.
static LISTENER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Identity of an engine instance.
///
/// Two sessions bound to engines with the same id are bound to the same engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineId(u64);

impl EngineId {
    /// Allocates a fresh, process-unique id.
    pub fn next() -> Self {
        Self(ENGINE_SEQ.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine#{}", self.0)
    }
}

/// Handle returned by [`Engine::add_listener`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocates a fresh, process-unique id.
    pub fn next() -> Self {
        Self(LISTENER_SEQ.fetch_add(1, Ordering::Relaxed))
    }
}

/// Receiver of engine-reported task transitions.
///
/// Called from whatever thread the engine reports on; implementations must
/// not block.
pub trait EngineListener: Send + Sync + 'static {
    /// The engine started running `task`.
    fn on_task_start(&self, task: &TaskId);

    /// The engine stopped `task`.
    fn on_task_stop(&self, task: &TaskId);

    /// The engine is instrumenting classes for `task`.
    fn on_task_instrumenting(&self, _task: &TaskId) {}

    /// True once the listener has nothing left to notify; registries may drop it.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Contract for instrumentation engines.
///
/// `start`/`stop` may complete synchronously or only trigger the work; the
/// authoritative transition is reported through [`EngineListener`].
#[async_trait]
pub trait Engine: Send + Sync + 'static {
    /// Stable identity of this engine.
    fn id(&self) -> EngineId;

    /// Deploys the session's script into its target process.
    async fn start(&self, task: &TaskController) -> Result<(), EngineError>;

    /// Withdraws the session's script from its target process.
    async fn stop(&self, task: &TaskController) -> Result<(), EngineError>;

    /// Triggers a script event; `None` triggers anonymous event handlers.
    async fn send_event(
        &self,
        task: &TaskController,
        event: Option<&str>,
    ) -> Result<(), EngineError>;

    /// Subscribes to task transitions.
    fn add_listener(&self, listener: Arc<dyn EngineListener>) -> ListenerId;

    /// Unsubscribes; unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}
