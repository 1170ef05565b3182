//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::classpath::ProcessDetails;
use crate::commands::{Command, CommandListener};
use crate::core::{StateListener, TaskController, TaskId, TaskState};
use crate::engine::{Engine, EngineId, EngineListener, EngineListeners, ListenerId};
use crate::error::EngineError;

/// Scriptable engine.
///
/// By default `start` succeeds and immediately reports the task as started,
/// `stop` succeeds and immediately reports it as stopped.
pub(crate) struct MockEngine {
    id: EngineId,
    listeners: EngineListeners,
    start_result: Mutex<Result<(), EngineError>>,
    stop_result: Mutex<Result<(), EngineError>>,
    report_transitions: AtomicBool,
    instrument_on_start: AtomicBool,
    starts: AtomicUsize,
    stops: AtomicUsize,
    events: Mutex<Vec<(TaskId, Option<String>)>>,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: EngineId::next(),
            listeners: EngineListeners::new(),
            start_result: Mutex::new(Ok(())),
            stop_result: Mutex::new(Ok(())),
            report_transitions: AtomicBool::new(true),
            instrument_on_start: AtomicBool::new(false),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn set_start_result(&self, result: Result<(), EngineError>) {
        *self.start_result.lock() = result;
    }

    pub fn set_stop_result(&self, result: Result<(), EngineError>) {
        *self.stop_result.lock() = result;
    }

    /// Stop reporting transitions; tests drive them through `listeners()`.
    pub fn silent(&self) {
        self.report_transitions.store(false, Ordering::SeqCst);
    }

    pub fn instrument_on_start(&self) {
        self.instrument_on_start.store(true, Ordering::SeqCst);
    }

    pub fn listeners(&self) -> &EngineListeners {
        &self.listeners
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<(TaskId, Option<String>)> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl Engine for MockEngine {
    fn id(&self) -> EngineId {
        self.id
    }

    async fn start(&self, task: &TaskController) -> Result<(), EngineError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        let result = self.start_result.lock().clone();
        if result.is_ok() && self.report_transitions.load(Ordering::SeqCst) {
            if self.instrument_on_start.load(Ordering::SeqCst) {
                self.listeners.notify_instrumenting(&task.id());
            } else {
                self.listeners.notify_start(&task.id());
            }
        }
        result
    }

    async fn stop(&self, task: &TaskController) -> Result<(), EngineError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        let result = self.stop_result.lock().clone();
        if result.is_ok() && self.report_transitions.load(Ordering::SeqCst) {
            self.listeners.notify_stop(&task.id());
        }
        result
    }

    async fn send_event(
        &self,
        task: &TaskController,
        event: Option<&str>,
    ) -> Result<(), EngineError> {
        self.events
            .lock()
            .push((task.id(), event.map(str::to_string)));
        Ok(())
    }

    fn add_listener(&self, listener: Arc<dyn EngineListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

/// Records every state it is notified of.
#[derive(Default)]
pub(crate) struct RecordingStates {
    states: Mutex<Vec<TaskState>>,
}

impl RecordingStates {
    pub fn states(&self) -> Vec<TaskState> {
        self.states.lock().clone()
    }
}

impl StateListener for RecordingStates {
    fn state_changed(&self, state: TaskState) {
        self.states.lock().push(state);
    }
}

/// Records every command it receives.
#[derive(Default)]
pub(crate) struct RecordingCommands {
    commands: Mutex<Vec<Command>>,
}

impl RecordingCommands {
    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().clone()
    }

    /// Polls until `n` commands arrived or `timeout` elapsed.
    pub async fn wait_for(&self, n: usize, timeout: Duration) -> Vec<Command> {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.commands.lock().len() < n && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.commands()
    }
}

#[async_trait]
impl CommandListener for RecordingCommands {
    async fn on_command(&self, command: &Command) {
        self.commands.lock().push(command.clone());
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// In-memory writer whose clones share one buffer.
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fixed properties for every pid.
pub(crate) struct FixedDetails(pub HashMap<String, String>);

impl FixedDetails {
    pub fn new(pairs: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
    }
}

impl ProcessDetails for FixedDetails {
    fn system_properties(&self, _pid: u32) -> HashMap<String, String> {
        self.0.clone()
    }
}
