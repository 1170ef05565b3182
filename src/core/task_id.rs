use std::fmt;

use crate::engine::EngineId;

/// Identity of a session: the target process and the engine it is bound to.
///
/// Script, listeners and state do not take part in identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    pid: u32,
    engine: EngineId,
}

impl TaskId {
    /// Creates an id for process `pid` on `engine`.
    pub fn new(pid: u32, engine: EngineId) -> Self {
        Self { pid, engine }
    }

    /// Target process id.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Bound engine.
    pub fn engine(&self) -> EngineId {
        self.engine
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid={}@{}", self.pid, self.engine)
    }
}
