use std::sync::Arc;

use super::{OutputSink, TaskController};
use crate::classpath::{NullProcessDetails, ProcessDetails};
use crate::commands::DispatchHandle;
use crate::engine::Engine;

/// Builder for a [`TaskController`] with optional collaborators.
///
/// # Example
/// ```no_run
/// # async fn demo(engine: std::sync::Arc<dyn tracevisor::Engine>) {
/// use tracevisor::{CommandDispatcher, Config, TaskController};
///
/// let dispatcher = CommandDispatcher::new(&Config::default());
/// let session = TaskController::builder(4242, engine, dispatcher.handle())
///     .with_script(r#"@BTrace(name = "probe") public class Probe {}"#)
///     .build();
///
/// assert_eq!(session.name().as_deref(), Some("probe"));
/// # }
/// ```
pub struct TaskControllerBuilder {
    pid: u32,
    engine: Arc<dyn Engine>,
    dispatcher: DispatchHandle,
    details: Arc<dyn ProcessDetails>,
    output: OutputSink,
    script: Option<String>,
}

impl TaskControllerBuilder {
    /// Creates a builder with no process-details provider and stdout output.
    pub fn new(pid: u32, engine: Arc<dyn Engine>, dispatcher: DispatchHandle) -> Self {
        Self {
            pid,
            engine,
            dispatcher,
            details: Arc::new(NullProcessDetails),
            output: OutputSink::stdout(),
            script: None,
        }
    }

    /// Sets the provider used to compute the initial class path.
    pub fn with_process_details(mut self, details: Arc<dyn ProcessDetails>) -> Self {
        self.details = details;
        self
    }

    /// Sets the console sink.
    pub fn with_output(mut self, output: OutputSink) -> Self {
        self.output = output;
        self
    }

    /// Loads a script as if by [`TaskController::set_script`].
    pub fn with_script(mut self, source: impl Into<String>) -> Self {
        self.script = Some(source.into());
        self
    }

    /// Builds the session and registers it with the engine.
    pub fn build(self) -> Arc<TaskController> {
        let controller = TaskController::new(
            self.pid,
            self.engine,
            self.details,
            self.dispatcher,
            self.output,
        );
        if let Some(source) = self.script {
            controller.set_script(source);
        }
        controller
    }
}
