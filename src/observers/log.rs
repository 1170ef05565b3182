//! # LogWriter: session trace for debugging and demos.
//!
//! Emits one `tracing` event per state change and per engine command.
//!
//! ## Example output (with a fmt subscriber)
//! ```text
//! INFO state changed task=pid=4242@engine#1 state=starting
//! INFO state changed task=pid=4242@engine#1 state=running
//! INFO command task=pid=4242@engine#1 kind=message text="hello\n"
//! INFO command task=pid=4242@engine#1 kind=exit code=0
//! ```
//!
//! ## Example
//! ```no_run
//! # fn demo(session: std::sync::Arc<tracevisor::TaskController>) {
//! use std::sync::Arc;
//! use tracevisor::LogWriter;
//!
//! let writer = Arc::new(LogWriter::new(session.id()));
//! session.add_state_listener(writer.clone());
//! session.add_command_listener(writer);
//! # }
//! ```

use async_trait::async_trait;

use crate::commands::{Command, CommandListener};
use crate::core::{StateListener, TaskId, TaskState};

/// Logs the lifecycle and command stream of one session.
///
/// Not intended for production use; implement [`StateListener`] or
/// [`CommandListener`] for structured export.
#[derive(Debug, Clone, Copy)]
pub struct LogWriter {
    task: TaskId,
}

impl LogWriter {
    /// Construct a writer tagging every record with `task`.
    #[must_use]
    pub fn new(task: TaskId) -> Self {
        Self { task }
    }
}

impl StateListener for LogWriter {
    fn state_changed(&self, state: TaskState) {
        tracing::info!(task = %self.task, state = state.as_label(), "state changed");
    }
}

#[async_trait]
impl CommandListener for LogWriter {
    async fn on_command(&self, c: &Command) {
        let kind = c.as_label();
        match c {
            Command::Message(text) => {
                tracing::info!(task = %self.task, kind, text = ?text, "command");
            }
            Command::Error(text) => {
                tracing::warn!(task = %self.task, kind, text = ?text, "command");
            }
            Command::Exit(code) => {
                tracing::info!(task = %self.task, kind, code, "command");
            }
            Command::Success => {
                tracing::info!(task = %self.task, kind, "command");
            }
            Command::Number { name, value } => {
                tracing::info!(task = %self.task, kind, name = %name, value, "command");
            }
            Command::NumberMap { name, entries } => {
                tracing::info!(task = %self.task, kind, name = %name, entries = ?entries, "command");
            }
            Command::StringMap { name, entries } => {
                tracing::info!(task = %self.task, kind, name = %name, entries = ?entries, "command");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineId;

    #[tokio::test]
    async fn test_handles_every_command_without_subscriber() {
        let writer = LogWriter::new(TaskId::new(1, EngineId::next()));
        writer.state_changed(TaskState::Running);
        for c in [
            Command::message("hi"),
            Command::error("boom"),
            Command::Exit(3),
            Command::Success,
            Command::Number {
                name: "n".into(),
                value: 1,
            },
        ] {
            writer.on_command(&c).await;
        }
        assert_eq!(CommandListener::name(&writer), "LogWriter");
    }
}
