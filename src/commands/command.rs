//! # Commands delivered by the engine to a session.
//!
//! Commands carry the running script's output back to observers: console
//! messages, errors, the exit code and aggregated data.
//!
//! ## Example
//! ```rust
//! use tracevisor::Command;
//!
//! let cmd = Command::message("hit count: 3\n");
//! assert_eq!(cmd.as_label(), "message");
//! assert!(!cmd.is_terminal());
//! ```

use std::collections::BTreeMap;

/// Engine-originated command.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Text printed by the script.
    Message(String),

    /// Error raised inside the target process by the script.
    Error(String),

    /// The script exited with a status code.
    Exit(i32),

    /// The engine acknowledged the last request.
    Success,

    /// A single named number.
    Number {
        /// Aggregate name.
        name: String,
        /// Current value.
        value: i64,
    },

    /// A named map of numbers (histograms, counters).
    NumberMap {
        /// Aggregate name.
        name: String,
        /// Key → value, sorted by key.
        entries: BTreeMap<String, i64>,
    },

    /// A named map of strings.
    StringMap {
        /// Aggregate name.
        name: String,
        /// Key → value, sorted by key.
        entries: BTreeMap<String, String>,
    },
}

impl Command {
    /// Creates a [`Command::Message`].
    #[inline]
    pub fn message(text: impl Into<String>) -> Self {
        Command::Message(text.into())
    }

    /// Creates a [`Command::Error`].
    #[inline]
    pub fn error(text: impl Into<String>) -> Self {
        Command::Error(text.into())
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Command::Message(_) => "message",
            Command::Error(_) => "error",
            Command::Exit(_) => "exit",
            Command::Success => "success",
            Command::Number { .. } => "number",
            Command::NumberMap { .. } => "number_map",
            Command::StringMap { .. } => "string_map",
        }
    }

    /// True for the last command a script can send.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Command::Exit(_))
    }
}
