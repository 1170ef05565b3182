//! # ConsoleWriter: renders commands to a session's console
//!
//! ## Example output
//! ```text
//! hit count: 3          (Message, written verbatim)
//! [error] NPE in probe  (Error)
//! [number] hits=42      (Number)
//! [number-map] latency  (NumberMap, followed by one "  key = value" line per entry)
//! [exit] code=0         (Exit)
//! ```

use async_trait::async_trait;

use super::{Command, CommandListener};
use crate::core::OutputSink;

/// Command listener writing to an [`OutputSink`].
///
/// Holds a clone of the sink, so replacing the session's writer redirects
/// this listener too.
pub struct ConsoleWriter {
    sink: OutputSink,
}

impl ConsoleWriter {
    /// Creates a writer bound to `sink`.
    #[must_use]
    pub fn new(sink: OutputSink) -> Self {
        Self { sink }
    }

    fn render(command: &Command) -> String {
        match command {
            Command::Message(text) => text.clone(),
            Command::Error(text) => format!("[error] {text}\n"),
            Command::Exit(code) => format!("[exit] code={code}\n"),
            Command::Success => String::new(),
            Command::Number { name, value } => format!("[number] {name}={value}\n"),
            Command::NumberMap { name, entries } => {
                let mut out = format!("[number-map] {name}\n");
                for (key, value) in entries {
                    out.push_str(&format!("  {key} = {value}\n"));
                }
                out
            }
            Command::StringMap { name, entries } => {
                let mut out = format!("[string-map] {name}\n");
                for (key, value) in entries {
                    out.push_str(&format!("  {key} = {value}\n"));
                }
                out
            }
        }
    }
}

#[async_trait]
impl CommandListener for ConsoleWriter {
    async fn on_command(&self, command: &Command) {
        let text = Self::render(command);
        if text.is_empty() {
            return;
        }
        if let Err(e) = self.sink.write_str(&text) {
            tracing::warn!(error = %e, command = command.as_label(), "console write failed");
        }
    }

    fn name(&self) -> &'static str {
        "ConsoleWriter"
    }
}
