//! # TaskController: one instrumentation session
//!
//! Owns the session state, relays start/stop to the bound [`Engine`], fans out
//! state changes and engine commands, and derives metadata from the script.
//!
//! ## Start / stop
//! ```text
//! start():
//!   ├─► previous = state
//!   ├─► state = Starting            (notify)
//!   ├─► engine.start(&self).await
//!   │     ├─ Ok  ──► engine reports onTaskStart ──► Running (notify)
//!   │     └─ Err ──► state = previous (notify), return Err
//!
//! stop():
//!   ├─► state != Running ──► no-op
//!   ├─► engine.stop(&self).await
//!   │     ├─ Ok  ──► engine reports onTaskStop ──► Finished (notify)
//!   │     └─ Err ──► state = Running (notify), return Err
//! ```
//!
//! ## Rules
//! - Every state write notifies, including the speculative `Starting` and rollbacks.
//! - Writes and their fan-out are serialized by one re-entrant lock: observers
//!   see writes in the order they happened, and each receives the state read
//!   under that lock. A slow state listener therefore delays engine callbacks.
//! - Engine callbacks for another session are ignored.
//! - The class count is reported only while `Instrumenting` or `Running`.
//! - A later script without an `unsafe` declaration keeps the previous flag.

use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex, RwLock};

use super::listeners::{ListenerSet, StateListener};
use super::state::AtomicState;
use super::{OutputSink, TaskControllerBuilder, TaskId, TaskState};
use crate::classpath::{ClassPathBuilder, ProcessDetails};
use crate::commands::{Command, CommandListener, DispatchHandle};
use crate::engine::{Engine, EngineListener, ListenerId};
use crate::error::{DispatchError, EngineError};
use crate::script::ScriptMetadata;

/// Script text together with the metadata derived from it.
struct LoadedScript {
    source: Arc<str>,
    metadata: ScriptMetadata,
}

/// Controller of a single instrumentation session.
///
/// Built with [`TaskController::builder`]; always shared as `Arc<TaskController>`.
/// Equality and hashing use the [`TaskId`] only.
pub struct TaskController {
    id: TaskId,
    engine: Arc<dyn Engine>,
    details: Arc<dyn ProcessDetails>,
    dispatcher: DispatchHandle,

    state: AtomicState,
    transition: ReentrantMutex<()>,
    instr_classes: AtomicU32,
    unsafe_flag: AtomicBool,
    script: RwLock<Option<LoadedScript>>,
    class_path: Mutex<BTreeSet<String>>,

    state_listeners: ListenerSet<dyn StateListener>,
    command_listeners: ListenerSet<dyn CommandListener>,
    output: OutputSink,

    registration: Mutex<Option<ListenerId>>,
}

impl TaskController {
    /// Starts building a session for process `pid` on `engine`.
    pub fn builder(
        pid: u32,
        engine: Arc<dyn Engine>,
        dispatcher: DispatchHandle,
    ) -> TaskControllerBuilder {
        TaskControllerBuilder::new(pid, engine, dispatcher)
    }

    pub(super) fn new(
        pid: u32,
        engine: Arc<dyn Engine>,
        details: Arc<dyn ProcessDetails>,
        dispatcher: DispatchHandle,
        output: OutputSink,
    ) -> Arc<Self> {
        let controller = Arc::new(Self {
            id: TaskId::new(pid, engine.id()),
            engine,
            details,
            dispatcher,
            state: AtomicState::new(TaskState::New),
            transition: ReentrantMutex::new(()),
            instr_classes: AtomicU32::new(0),
            unsafe_flag: AtomicBool::new(false),
            script: RwLock::new(None),
            class_path: Mutex::new(BTreeSet::new()),
            state_listeners: ListenerSet::new(),
            command_listeners: ListenerSet::new(),
            output,
            registration: Mutex::new(None),
        });

        let link = Arc::new(SessionLink {
            target: Arc::downgrade(&controller),
        });
        let id = controller.engine.add_listener(link);
        *controller.registration.lock() = Some(id);
        controller
    }

    /// Session identity.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Target process id.
    pub fn pid(&self) -> u32 {
        self.id.pid()
    }

    /// The bound engine.
    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        self.state.load()
    }

    // ---------------------------
    // Lifecycle
    // ---------------------------

    /// Asks the engine to deploy the script.
    ///
    /// Callable from any state. On engine failure the state observed before
    /// the call is restored and the error returned.
    pub async fn start(&self) -> Result<(), EngineError> {
        let previous = self.state();
        self.set_state(TaskState::Starting);

        if let Err(e) = self.engine.start(self).await {
            tracing::warn!(
                task = %self.id,
                error = e.as_label(),
                detail = %e.as_message(),
                rollback = previous.as_label(),
                "engine start failed"
            );
            self.set_state(previous);
            return Err(e);
        }
        Ok(())
    }

    /// Asks the engine to withdraw the script. No-op unless `Running`.
    ///
    /// On engine failure the state is forced back to `Running`.
    pub async fn stop(&self) -> Result<(), EngineError> {
        if self.state() != TaskState::Running {
            return Ok(());
        }

        if let Err(e) = self.engine.stop(self).await {
            tracing::warn!(
                task = %self.id,
                error = e.as_label(),
                detail = %e.as_message(),
                "engine stop failed"
            );
            self.set_state(TaskState::Running);
            return Err(e);
        }
        Ok(())
    }

    /// Triggers the script's handler for the named event.
    pub async fn send_event(&self, name: &str) -> Result<(), EngineError> {
        self.engine.send_event(self, Some(name)).await
    }

    /// Triggers the script's anonymous event handlers.
    pub async fn send_anonymous_event(&self) -> Result<(), EngineError> {
        self.engine.send_event(self, None).await
    }

    /// Unregisters from the engine. Called automatically on drop.
    pub fn detach(&self) {
        if let Some(id) = self.registration.lock().take() {
            self.engine.remove_listener(id);
            tracing::debug!(task = %self.id, "session detached from engine");
        }
    }

    /// Number of instrumented classes; `None` unless instrumentation is active.
    pub fn instrumented_classes(&self) -> Option<u32> {
        if self.state().is_instrumented() {
            Some(self.instr_classes.load(Ordering::Acquire))
        } else {
            None
        }
    }

    /// Records the instrumented class count reported by the engine.
    pub fn set_instrumented_classes(&self, count: u32) {
        self.instr_classes.store(count, Ordering::Release);
    }

    fn set_state(&self, next: TaskState) {
        let _transition = self.transition.lock();
        let previous = self.state.swap(next);
        tracing::debug!(
            task = %self.id,
            from = previous.as_label(),
            to = next.as_label(),
            "state changed"
        );
        self.state_listeners.notify(&self.id, self.state());
    }

    fn on_engine_start(&self) {
        self.set_state(TaskState::Running);
    }

    fn on_engine_stop(&self) {
        self.set_state(TaskState::Finished);
    }

    fn on_engine_instrumenting(&self) {
        let _transition = self.transition.lock();
        if self
            .state
            .compare_exchange(TaskState::Starting, TaskState::Instrumenting)
        {
            tracing::debug!(task = %self.id, "instrumenting");
            self.state_listeners.notify(&self.id, self.state());
        }
    }

    // ---------------------------
    // Script
    // ---------------------------

    /// Stores the script text and re-derives its metadata.
    ///
    /// The unsafe flag only changes when the new text declares it.
    pub fn set_script(&self, source: impl Into<Arc<str>>) {
        let source = source.into();
        let metadata = ScriptMetadata::extract(&source);
        let mut script = self.script.write();
        if let Some(flag) = metadata.unsafe_flag() {
            self.unsafe_flag.store(flag, Ordering::Release);
        }
        *script = Some(LoadedScript { source, metadata });
    }

    /// The current script text.
    pub fn script(&self) -> Option<Arc<str>> {
        self.script.read().as_ref().map(|s| Arc::clone(&s.source))
    }

    /// Declared script name.
    pub fn name(&self) -> Option<String> {
        self.with_metadata(|m| m.name().map(str::to_string)).flatten()
    }

    /// Distinct named events declared by the script.
    pub fn named_events(&self) -> BTreeSet<String> {
        self.with_metadata(|m| m.named_events().clone()).unwrap_or_default()
    }

    /// True if the script declares an anonymous event handler.
    pub fn has_anonymous_events(&self) -> bool {
        self.with_metadata(ScriptMetadata::has_anonymous_events).unwrap_or(false)
    }

    /// True if the script declares any event handler.
    pub fn has_events(&self) -> bool {
        self.with_metadata(ScriptMetadata::has_events).unwrap_or(false)
    }

    /// Unsafe permission bit declared by the (latest declaring) script.
    pub fn is_unsafe(&self) -> bool {
        let _script = self.script.read();
        self.unsafe_flag.load(Ordering::Acquire)
    }

    fn with_metadata<R>(&self, f: impl FnOnce(&ScriptMetadata) -> R) -> Option<R> {
        self.script.read().as_ref().map(|s| f(&s.metadata))
    }

    // ---------------------------
    // Class path
    // ---------------------------

    /// Adds a user class-path entry; false if already present.
    pub fn add_cp_entry(&self, entry: impl Into<String>) -> bool {
        self.class_path.lock().insert(entry.into())
    }

    /// Removes a user class-path entry; false if absent.
    pub fn remove_cp_entry(&self, entry: &str) -> bool {
        self.class_path.lock().remove(entry)
    }

    /// Initial class path of the target process followed by user entries.
    pub fn class_path(&self) -> String {
        let props = self.system_properties();
        let entries: Vec<String> = self.class_path.lock().iter().cloned().collect();
        ClassPathBuilder::from_properties(&props)
            .with_entries(entries)
            .build()
    }

    /// System properties reported by the target process.
    pub fn system_properties(&self) -> HashMap<String, String> {
        self.details.system_properties(self.pid())
    }

    // ---------------------------
    // Observers
    // ---------------------------

    /// Registers a state listener. Adding the same handle twice is a no-op.
    pub fn add_state_listener(&self, listener: Arc<dyn StateListener>) {
        self.state_listeners.add(listener);
    }

    /// Unregisters a state listener. Absent handles are ignored.
    pub fn remove_state_listener(&self, listener: &Arc<dyn StateListener>) {
        self.state_listeners.remove(listener);
    }

    /// Registers a command listener. Adding the same handle twice is a no-op.
    pub fn add_command_listener(&self, listener: Arc<dyn CommandListener>) {
        self.command_listeners.add(listener);
    }

    /// Unregisters a command listener. Absent handles are ignored.
    pub fn remove_command_listener(&self, listener: &Arc<dyn CommandListener>) {
        self.command_listeners.remove(listener);
    }

    /// Fans `command` out to the current command listeners, off this thread.
    pub fn dispatch_command(&self, command: Command) -> Result<(), DispatchError> {
        let label = command.as_label();
        if command.is_terminal() {
            tracing::debug!(task = %self.id, command = label, "script exited");
        }
        let snapshot = self.command_listeners.snapshot();
        self.dispatcher
            .post(&self.id, command, snapshot)
            .inspect_err(|e| {
                tracing::warn!(
                    task = %self.id,
                    command = label,
                    reason = e.as_label(),
                    "command dropped"
                );
            })
    }

    // ---------------------------
    // Console
    // ---------------------------

    /// Redirects the session console to `writer`.
    pub fn set_writer(&self, writer: impl Write + Send + 'static) {
        self.output.replace(writer);
    }

    /// The session console. Clones follow later [`set_writer`](Self::set_writer) calls.
    pub fn output(&self) -> OutputSink {
        self.output.clone()
    }
}

impl PartialEq for TaskController {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TaskController {}

impl Hash for TaskController {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Drop for TaskController {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Engine-side registration; never keeps the session alive.
struct SessionLink {
    target: Weak<TaskController>,
}

impl SessionLink {
    fn matching(&self, task: &TaskId) -> Option<Arc<TaskController>> {
        self.target.upgrade().filter(|c| c.id == *task)
    }
}

impl EngineListener for SessionLink {
    fn on_task_start(&self, task: &TaskId) {
        if let Some(controller) = self.matching(task) {
            controller.on_engine_start();
        }
    }

    fn on_task_stop(&self, task: &TaskId) {
        if let Some(controller) = self.matching(task) {
            controller.on_engine_stop();
        }
    }

    fn on_task_instrumenting(&self, task: &TaskId) {
        if let Some(controller) = self.matching(task) {
            controller.on_engine_instrumenting();
        }
    }

    fn is_closed(&self) -> bool {
        self.target.strong_count() == 0
    }
}
