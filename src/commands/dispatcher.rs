//! # CommandDispatcher: off-thread command fan-out
//!
//! [`CommandDispatcher`] owns a small pool of tokio worker tasks. Sessions post
//! a command together with a snapshot of their listeners through a cloneable
//! [`DispatchHandle`]; a worker delivers it to every listener in the snapshot.
//!
//! ## Architecture
//! ```text
//! post(task, cmd, snapshot)
//!     │  hash(task) % workers
//!     ├──► [queue 0] ──► worker 0 ──► l1.on_command() ─► l2.on_command() ...
//!     │    (bounded)         └──────► panic → warn, next listener
//!     └──► [queue N] ──► worker N ──► ...
//! ```
//!
//! ## Rules
//! - **Non-blocking**: `post()` uses `try_send` and returns immediately.
//! - **Snapshot**: listeners added after `post()` miss that command; listeners
//!   removed after `post()` still get it.
//! - **Per-session FIFO**: one session always lands on the same worker.
//! - **No cross-worker ordering** when `dispatch_workers > 1`.
//! - **Isolation**: each listener call is wrapped in `catch_unwind`.
//! - **Overflow**: a full queue drops the command and returns [`DispatchError::Full`].
//!
//! **Warning**: `AssertUnwindSafe` is used, so a listener that panics while
//! holding its own lock may leave its state poisoned or inconsistent.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use super::{Command, CommandListener};
use crate::config::Config;
use crate::core::TaskId;
use crate::error::{DispatchError, panic_info};

/// One command bound for a fixed set of listeners.
struct Delivery {
    task: TaskId,
    command: Arc<Command>,
    listeners: Vec<Arc<dyn CommandListener>>,
}

/// Cloneable posting side of a [`CommandDispatcher`].
#[derive(Clone)]
pub struct DispatchHandle {
    queues: Arc<[mpsc::Sender<Delivery>]>,
}

impl DispatchHandle {
    /// Queues `command` for delivery to `listeners`.
    ///
    /// An empty snapshot is accepted and dropped without touching a queue.
    pub fn post(
        &self,
        task: &TaskId,
        command: Command,
        listeners: Vec<Arc<dyn CommandListener>>,
    ) -> Result<(), DispatchError> {
        if listeners.is_empty() {
            return Ok(());
        }
        let delivery = Delivery {
            task: *task,
            command: Arc::new(command),
            listeners,
        };

        let queue = &self.queues[self.route(task)];
        queue.try_send(delivery).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::Full,
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
        })
    }

    /// Number of worker queues behind this handle.
    pub fn workers(&self) -> usize {
        self.queues.len()
    }

    fn route(&self, task: &TaskId) -> usize {
        let mut hasher = DefaultHasher::new();
        task.hash(&mut hasher);
        (hasher.finish() % self.queues.len() as u64) as usize
    }
}

/// Application-owned worker pool delivering commands to listeners.
///
/// Must be created inside a tokio runtime.
pub struct CommandDispatcher {
    handle: DispatchHandle,
    workers: Vec<JoinHandle<()>>,
    token: CancellationToken,
}

impl CommandDispatcher {
    /// Spawns `cfg.workers_clamped()` workers with bounded queues.
    #[must_use]
    pub fn new(cfg: &Config) -> Self {
        let count = cfg.workers_clamped();
        let capacity = cfg.queue_capacity_clamped();
        let token = CancellationToken::new();

        let mut queues = Vec::with_capacity(count);
        let mut workers = Vec::with_capacity(count);
        for index in 0..count {
            let (tx, rx) = mpsc::channel::<Delivery>(capacity);
            workers.push(tokio::spawn(run_worker(index, rx, token.clone())));
            queues.push(tx);
        }

        Self {
            handle: DispatchHandle {
                queues: queues.into(),
            },
            workers,
            token,
        }
    }

    /// Returns a posting handle for sessions.
    pub fn handle(&self) -> DispatchHandle {
        self.handle.clone()
    }

    /// Stops accepting commands, delivers what is already queued, and waits
    /// for every worker to exit.
    pub async fn shutdown(self) {
        self.token.cancel();
        drop(self.handle);
        for h in self.workers {
            let _ = h.await;
        }
    }
}

async fn run_worker(index: usize, mut rx: mpsc::Receiver<Delivery>, token: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            msg = rx.recv() => match msg {
                Some(delivery) => deliver(index, delivery).await,
                None => return,
            },
        }
    }

    rx.close();
    while let Some(delivery) = rx.recv().await {
        deliver(index, delivery).await;
    }
    tracing::debug!(worker = index, "command dispatcher worker stopped");
}

async fn deliver(worker: usize, delivery: Delivery) {
    for listener in &delivery.listeners {
        let fut = listener.on_command(delivery.command.as_ref());
        if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            tracing::warn!(
                worker,
                task = %delivery.task,
                listener = listener.name(),
                command = delivery.command.as_label(),
                info = %panic_info(panic_err.as_ref()),
                "command listener panicked"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineId;
    use crate::testing::RecordingCommands;
    use std::time::Duration;

    struct Panicking;

    #[async_trait::async_trait]
    impl CommandListener for Panicking {
        async fn on_command(&self, _command: &Command) {
            panic!("listener failure");
        }
    }

    #[tokio::test]
    async fn test_delivers_posted_command() {
        let dispatcher = CommandDispatcher::new(&Config::default());
        let rec = Arc::new(RecordingCommands::default());
        let sink: Arc<dyn CommandListener> = rec.clone();
        let task = TaskId::new(1, EngineId::next());

        dispatcher
            .handle()
            .post(&task, Command::message("hi"), vec![sink.clone()])
            .unwrap();

        let got = rec.wait_for(1, Duration::from_secs(2)).await;
        assert_eq!(got, vec![Command::message("hi")]);
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_panicking_listener_does_not_block_others() {
        let dispatcher = CommandDispatcher::new(&Config::default());
        let rec = Arc::new(RecordingCommands::default());
        let sink: Arc<dyn CommandListener> = rec.clone();
        let task = TaskId::new(2, EngineId::next());
        let handle = dispatcher.handle();

        let bad: Arc<dyn CommandListener> = Arc::new(Panicking);

        handle
            .post(&task, Command::Exit(1), vec![bad.clone(), sink.clone()])
            .unwrap();
        handle
            .post(&task, Command::Success, vec![bad, sink.clone()])
            .unwrap();

        let got = rec.wait_for(2, Duration::from_secs(2)).await;
        assert_eq!(got, vec![Command::Exit(1), Command::Success]);
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_per_session_order_with_many_workers() {
        let cfg = Config {
            dispatch_workers: 4,
            ..Config::default()
        };
        let dispatcher = CommandDispatcher::new(&cfg);
        let rec = Arc::new(RecordingCommands::default());
        let sink: Arc<dyn CommandListener> = rec.clone();
        let task = TaskId::new(3, EngineId::next());
        let handle = dispatcher.handle();
        assert_eq!(handle.workers(), 4);

        for value in 0..50 {
            handle
                .post(
                    &task,
                    Command::Number {
                        name: "n".into(),
                        value,
                    },
                    vec![sink.clone()],
                )
                .unwrap();
        }

        let got = rec.wait_for(50, Duration::from_secs(2)).await;
        let values: Vec<i64> = got
            .iter()
            .map(|c| match c {
                Command::Number { value, .. } => *value,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(values, (0..50).collect::<Vec<_>>());
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_drains_then_closes() {
        let dispatcher = CommandDispatcher::new(&Config::default());
        let rec = Arc::new(RecordingCommands::default());
        let sink: Arc<dyn CommandListener> = rec.clone();
        let task = TaskId::new(4, EngineId::next());
        let handle = dispatcher.handle();

        handle
            .post(&task, Command::message("last"), vec![sink.clone()])
            .unwrap();
        dispatcher.shutdown().await;

        assert_eq!(rec.commands(), vec![Command::message("last")]);
        assert_eq!(
            handle.post(&task, Command::Success, vec![sink.clone()]),
            Err(DispatchError::Closed)
        );
    }

    #[tokio::test]
    async fn test_full_queue_is_reported() {
        let cfg = Config {
            dispatch_workers: 1,
            dispatch_queue_capacity: 1,
        };
        let dispatcher = CommandDispatcher::new(&cfg);
        let handle = dispatcher.handle();
        let task = TaskId::new(5, EngineId::next());
        let rec = Arc::new(RecordingCommands::default());
        let sink: Arc<dyn CommandListener> = rec.clone();

        // Current-thread runtime: the worker cannot run until we yield.
        handle
            .post(&task, Command::Success, vec![sink.clone()])
            .unwrap();
        assert_eq!(
            handle.post(&task, Command::Success, vec![sink.clone()]),
            Err(DispatchError::Full)
        );
        dispatcher.shutdown().await;
    }
}
