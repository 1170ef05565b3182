//! # Session lifecycle state.
//!
//! ```text
//!            start()                onTaskInstrumenting
//!   New ───────────────► Starting ─────────────────────► Instrumenting
//!    ▲                     │   │                               │
//!    └── engine failure ───┘   │ onTaskStart                   │ onTaskStart
//!        (rollback to the      ▼                               ▼
//!         previous state)    Running ◄─────────────────────────┘
//!                              │ ▲
//!               onTaskStop     │ └── stop() failure
//!                              ▼
//!                           Finished ── start() ──► Starting ...
//! ```
//!
//! The state is held in an [`AtomicState`]: reads never block, writes overwrite.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a session.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Created, never started.
    New = 0,
    /// Start requested; waiting for the engine.
    Starting = 1,
    /// The engine is instrumenting classes.
    Instrumenting = 2,
    /// The script is running in the target process.
    Running = 3,
    /// The script was withdrawn.
    Finished = 4,
}

impl TaskState {
    /// True while instrumentation is active and the class count is meaningful.
    #[inline]
    pub fn is_instrumented(self) -> bool {
        matches!(self, TaskState::Instrumenting | TaskState::Running)
    }

    /// True if moving from `self` to `next` is an edge of the lifecycle.
    ///
    /// `Starting` is entered from anywhere and may resolve to anything
    /// (including a rollback).
    pub fn can_transition_to(self, next: TaskState) -> bool {
        match (self, next) {
            (_, TaskState::Starting) | (TaskState::Starting, _) => true,
            (TaskState::Instrumenting, TaskState::Running | TaskState::Finished) => true,
            (TaskState::Running, TaskState::Running | TaskState::Finished) => true,
            _ => false,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            TaskState::New => "new",
            TaskState::Starting => "starting",
            TaskState::Instrumenting => "instrumenting",
            TaskState::Running => "running",
            TaskState::Finished => "finished",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => TaskState::New,
            1 => TaskState::Starting,
            2 => TaskState::Instrumenting,
            3 => TaskState::Running,
            4 => TaskState::Finished,
            other => unreachable!("invalid task state tag {other}"),
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Lock-free cell holding a [`TaskState`].
#[derive(Debug)]
pub(crate) struct AtomicState(AtomicU8);

impl AtomicState {
    pub fn new(state: TaskState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn load(&self) -> TaskState {
        TaskState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Stores `next` and returns the state it replaced.
    pub fn swap(&self, next: TaskState) -> TaskState {
        TaskState::from_u8(self.0.swap(next as u8, Ordering::AcqRel))
    }

    /// Stores `next` only if the current state is `current`.
    pub fn compare_exchange(&self, current: TaskState, next: TaskState) -> bool {
        self.0
            .compare_exchange(current as u8, next as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
